//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide `TodoService` and its Dart-backed
//!   authentication capability.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every todo mutation goes through the gated service; no raw store access.
//! - Todo text is never logged.
//! - List and status reads never wait on an open authentication prompt.

use flutter_rust_bridge::DartFnFuture;
use log::warn;
use securetodo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_prompt_error,
    ping as ping_inner, AuthCapability, AuthFailure, AuthSession, AuthState, CapabilityError,
    Gated, PromptOptions, PromptOutcome, SystemClock, TodoId, TodoInput, TodoItem, TodoService,
    TodoSnapshot, TodoStatus,
};
use std::future::Future;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

type BoolCallback = Box<dyn Fn() -> DartFnFuture<bool> + Send + Sync>;
type PromptCallback = Box<dyn Fn(PromptRequest) -> DartFnFuture<PromptReport> + Send + Sync>;

static RUNTIME: OnceLock<TodoRuntime<DartAuthCapability>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Prompt presentation values handed to the Dart prompt callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt_message: String,
    pub cancel_label: String,
    pub fallback_label: String,
    pub disable_device_fallback: bool,
}

impl From<&PromptOptions> for PromptRequest {
    fn from(options: &PromptOptions) -> Self {
        Self {
            prompt_message: options.prompt_message.clone(),
            cancel_label: options.cancel_label.clone(),
            fallback_label: options.fallback_label.clone(),
            disable_device_fallback: options.disable_device_fallback,
        }
    }
}

/// Platform prompt result reported back by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptReport {
    pub success: bool,
    /// Platform error code such as `user_cancel` or `lockout`.
    pub error: Option<String>,
    /// Set when the platform call threw instead of returning a result.
    pub exception: Option<String>,
}

/// Authentication capability backed by Dart callbacks.
pub struct DartAuthCapability {
    has_hardware: BoolCallback,
    is_enrolled: BoolCallback,
    prompt: PromptCallback,
}

impl AuthCapability for DartAuthCapability {
    fn has_hardware(&self) -> impl Future<Output = Result<bool, CapabilityError>> + Send {
        let pending = (self.has_hardware)();
        async move { Ok(pending.await) }
    }

    fn is_enrolled(&self) -> impl Future<Output = Result<bool, CapabilityError>> + Send {
        let pending = (self.is_enrolled)();
        async move { Ok(pending.await) }
    }

    fn prompt(
        &self,
        options: &PromptOptions,
    ) -> impl Future<Output = Result<PromptOutcome, CapabilityError>> + Send {
        let pending = (self.prompt)(PromptRequest::from(options));
        async move { prompt_outcome_from_report(pending.await) }
    }
}

/// Registers the Dart authentication callbacks and creates the service.
///
/// # FFI contract
/// - Must be called once before any `todo_*` / `auth_*` call.
/// - Returns empty string on success and error message on failure.
pub fn register_auth_capability(
    has_hardware: impl Fn() -> DartFnFuture<bool> + Send + Sync + 'static,
    is_enrolled: impl Fn() -> DartFnFuture<bool> + Send + Sync + 'static,
    prompt: impl Fn(PromptRequest) -> DartFnFuture<PromptReport> + Send + Sync + 'static,
    prompt_message: Option<String>,
) -> String {
    let capability = DartAuthCapability {
        has_hardware: Box::new(has_hardware),
        is_enrolled: Box::new(is_enrolled),
        prompt: Box::new(prompt),
    };
    let mut options = PromptOptions::default();
    if let Some(message) = prompt_message.filter(|value| !value.trim().is_empty()) {
        options.prompt_message = message.trim().to_string();
    }

    let service = TodoService::with_options(Arc::new(SystemClock), capability, options);
    match RUNTIME.set(TodoRuntime::new(service)) {
        Ok(()) => String::new(),
        Err(_) => "auth capability already registered".to_string(),
    }
}

/// Todo row returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// `pending|completed`.
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&TodoItem> for TodoView {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            description: item.description.clone(),
            status: item.status.as_str().to_string(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// List response with the snapshot version for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub items: Vec<TodoView>,
    pub version: u64,
    pub pending: u32,
    pub completed: u32,
}

/// Result envelope for gated todo mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    /// Whether authentication passed and the action ran.
    pub performed: bool,
    /// Whether the collection changed.
    pub changed: bool,
    /// Created todo id (create only).
    pub todo_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Whether the UI should show `message` in an alert.
    pub alert: bool,
}

impl TodoActionResponse {
    fn changed(message: impl Into<String>, todo_id: Option<String>) -> Self {
        Self {
            performed: true,
            changed: true,
            todo_id,
            message: message.into(),
            alert: false,
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            performed: true,
            changed: false,
            todo_id: None,
            message: message.into(),
            alert: false,
        }
    }

    fn not_performed(failure: &AuthFailure) -> Self {
        Self {
            performed: false,
            changed: false,
            todo_id: None,
            message: failure.message(),
            alert: failure.should_alert(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            performed: false,
            changed: false,
            todo_id: None,
            message: message.into(),
            alert: true,
        }
    }
}

/// Session status envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatusResponse {
    /// `idle|pending|authenticated|error`.
    pub state: String,
    pub trusted: bool,
    /// User-facing message of the last failed attempt.
    pub message: Option<String>,
    pub alert: bool,
}

/// Creates a todo after authentication.
pub async fn todo_add(title: String, description: Option<String>) -> TodoActionResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.add_todo(title, description).await,
        None => service_unavailable("todo_add"),
    }
}

/// Replaces title/description of a todo after authentication.
pub async fn todo_update(
    id: String,
    title: String,
    description: Option<String>,
) -> TodoActionResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.update_todo(&id, title, description).await,
        None => service_unavailable("todo_update"),
    }
}

/// Deletes a todo after authentication.
pub async fn todo_delete(id: String) -> TodoActionResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.delete_todo(&id).await,
        None => service_unavailable("todo_delete"),
    }
}

/// Toggles pending/completed after authentication.
pub async fn todo_toggle(id: String) -> TodoActionResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.toggle_todo(&id).await,
        None => service_unavailable("todo_toggle"),
    }
}

/// Returns the latest published todo list (newest first). Not gated.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.list(),
        None => TodoListResponse {
            items: Vec::new(),
            version: 0,
            pending: 0,
            completed: 0,
        },
    }
}

/// Explicit unlock without a mutation.
pub async fn auth_authenticate() -> AuthStatusResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.authenticate().await,
        None => unregistered_status(),
    }
}

/// Logs out; the next mutation prompts again.
pub async fn auth_logout() -> AuthStatusResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.logout().await,
        None => unregistered_status(),
    }
}

/// Current session status, including `pending` while a prompt is open.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_status() -> AuthStatusResponse {
    match RUNTIME.get() {
        Some(runtime) => runtime.status(),
        None => unregistered_status(),
    }
}

/// Last published todo snapshot and auth status.
///
/// Written by store and session listeners while the service lock is held;
/// read without touching that lock.
struct ReadModel {
    todos: RwLock<TodoSnapshot>,
    auth: RwLock<AuthStatusResponse>,
}

impl ReadModel {
    fn set_todos(&self, snapshot: &TodoSnapshot) {
        *self.todos.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
    }

    fn set_auth(&self, session: &AuthSession) {
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = status_from_session(session);
    }
}

/// Gated service behind an async lock, plus its read model.
struct TodoRuntime<C> {
    service: Mutex<TodoService<C>>,
    view: Arc<ReadModel>,
}

impl<C: AuthCapability> TodoRuntime<C> {
    fn new(mut service: TodoService<C>) -> Self {
        let view = Arc::new(ReadModel {
            todos: RwLock::new(service.snapshot()),
            auth: RwLock::new(status_from_session(service.gate().session())),
        });

        let todos = Arc::clone(&view);
        service.subscribe(move |snapshot| todos.set_todos(snapshot));
        let auth = Arc::clone(&view);
        service.observe_auth(move |session| auth.set_auth(session));

        Self {
            service: Mutex::new(service),
            view,
        }
    }

    async fn add_todo(&self, title: String, description: Option<String>) -> TodoActionResponse {
        let mut service = self.service.lock().await;
        add_todo_with(&mut service, title, description).await
    }

    async fn update_todo(
        &self,
        id: &str,
        title: String,
        description: Option<String>,
    ) -> TodoActionResponse {
        let mut service = self.service.lock().await;
        update_todo_with(&mut service, id, title, description).await
    }

    async fn delete_todo(&self, id: &str) -> TodoActionResponse {
        let mut service = self.service.lock().await;
        delete_todo_with(&mut service, id).await
    }

    async fn toggle_todo(&self, id: &str) -> TodoActionResponse {
        let mut service = self.service.lock().await;
        toggle_todo_with(&mut service, id).await
    }

    async fn authenticate(&self) -> AuthStatusResponse {
        let mut service = self.service.lock().await;
        // The outcome is reflected in the returned status.
        let _ = service.authenticate().await;
        status_from_session(service.gate().session())
    }

    async fn logout(&self) -> AuthStatusResponse {
        let mut service = self.service.lock().await;
        service.logout();
        status_from_session(service.gate().session())
    }

    fn list(&self) -> TodoListResponse {
        let snapshot = self.view.todos.read().unwrap_or_else(PoisonError::into_inner).clone();
        list_from(&snapshot)
    }

    fn status(&self) -> AuthStatusResponse {
        self.view.auth.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn prompt_outcome_from_report(report: PromptReport) -> Result<PromptOutcome, CapabilityError> {
    if let Some(message) = report.exception {
        return Err(CapabilityError::new(message));
    }
    if report.success {
        return Ok(PromptOutcome::Success);
    }
    Ok(PromptOutcome::Failed(parse_prompt_error(
        report.error.as_deref().unwrap_or_default(),
    )))
}

async fn add_todo_with<C: AuthCapability>(
    service: &mut TodoService<C>,
    title: String,
    description: Option<String>,
) -> TodoActionResponse {
    let input = TodoInput { title, description };
    match service.add_todo(&input).await {
        Gated::Performed(Some(id)) => {
            TodoActionResponse::changed("Task created.", Some(id.to_string()))
        }
        Gated::Performed(None) => TodoActionResponse::unchanged("Title is required."),
        Gated::NotPerformed(failure) => TodoActionResponse::not_performed(&failure),
    }
}

async fn update_todo_with<C: AuthCapability>(
    service: &mut TodoService<C>,
    id: &str,
    title: String,
    description: Option<String>,
) -> TodoActionResponse {
    let Ok(id) = parse_todo_id(id) else {
        return TodoActionResponse::rejected("invalid todo id");
    };
    let input = TodoInput { title, description };
    bool_response(service.update_todo(id, &input).await, "Task updated.")
}

async fn delete_todo_with<C: AuthCapability>(
    service: &mut TodoService<C>,
    id: &str,
) -> TodoActionResponse {
    let Ok(id) = parse_todo_id(id) else {
        return TodoActionResponse::rejected("invalid todo id");
    };
    bool_response(service.delete_todo(id).await, "Task deleted.")
}

async fn toggle_todo_with<C: AuthCapability>(
    service: &mut TodoService<C>,
    id: &str,
) -> TodoActionResponse {
    let Ok(id) = parse_todo_id(id) else {
        return TodoActionResponse::rejected("invalid todo id");
    };
    bool_response(service.toggle_todo_status(id).await, "Task status changed.")
}

fn bool_response(outcome: Gated<bool>, message: &str) -> TodoActionResponse {
    match outcome {
        Gated::Performed(true) => TodoActionResponse::changed(message, None),
        Gated::Performed(false) => TodoActionResponse::unchanged("No matching task."),
        Gated::NotPerformed(failure) => TodoActionResponse::not_performed(&failure),
    }
}

fn list_from(snapshot: &TodoSnapshot) -> TodoListResponse {
    let completed = snapshot
        .items()
        .iter()
        .filter(|item| item.status == TodoStatus::Completed)
        .count();
    let pending = snapshot.items().len() - completed;
    TodoListResponse {
        items: snapshot.items().iter().map(TodoView::from).collect(),
        version: snapshot.version(),
        pending: u32::try_from(pending).unwrap_or(u32::MAX),
        completed: u32::try_from(completed).unwrap_or(u32::MAX),
    }
}

fn status_from_session(session: &AuthSession) -> AuthStatusResponse {
    let failure = session.last_failure();
    AuthStatusResponse {
        state: session.state().as_str().to_string(),
        trusted: session.is_trusted(),
        message: failure.map(AuthFailure::message),
        alert: failure.is_some_and(AuthFailure::should_alert),
    }
}

fn unregistered_status() -> AuthStatusResponse {
    AuthStatusResponse {
        state: AuthState::Idle.as_str().to_string(),
        trusted: false,
        message: Some("auth capability not registered".to_string()),
        alert: true,
    }
}

fn service_unavailable(call: &str) -> TodoActionResponse {
    warn!("event={call} module=ffi status=error reason=capability_not_registered");
    TodoActionResponse::rejected("auth capability not registered")
}

fn parse_todo_id(value: &str) -> Result<TodoId, uuid::Error> {
    Uuid::parse_str(value.trim())
}
