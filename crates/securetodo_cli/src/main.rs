//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `securetodo_core` linkage.
//! - Drive one gated add/toggle cycle against a simulated authenticator.
//!
//! Usage: `securetodo_cli [allow|cancel|deny|no-hardware|not-enrolled]`.

use futures::executor::block_on;
use log::warn;
use securetodo_core::{
    init_logging_from_env, AuthCapability, CapabilityError, Gated, PromptFailure, PromptOptions,
    PromptOutcome, SystemClock, TodoInput, TodoService,
};
use std::sync::Arc;

/// Authenticator whose answers are fixed by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simulated {
    Allow,
    Cancel,
    Deny,
    NoHardware,
    NotEnrolled,
}

impl Simulated {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "cancel" => Some(Self::Cancel),
            "deny" => Some(Self::Deny),
            "no-hardware" => Some(Self::NoHardware),
            "not-enrolled" => Some(Self::NotEnrolled),
            _ => None,
        }
    }
}

impl AuthCapability for Simulated {
    async fn has_hardware(&self) -> Result<bool, CapabilityError> {
        Ok(*self != Self::NoHardware)
    }

    async fn is_enrolled(&self) -> Result<bool, CapabilityError> {
        Ok(*self != Self::NotEnrolled)
    }

    async fn prompt(&self, _options: &PromptOptions) -> Result<PromptOutcome, CapabilityError> {
        Ok(match self {
            Self::Allow => PromptOutcome::Success,
            Self::Cancel => PromptOutcome::Failed(PromptFailure::UserCancel),
            _ => PromptOutcome::Failed(PromptFailure::Other("lockout".to_string())),
        })
    }
}

fn main() {
    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    println!("securetodo_core ping={}", securetodo_core::ping());
    println!("securetodo_core version={}", securetodo_core::core_version());

    let arg = std::env::args().nth(1).unwrap_or_else(|| "allow".to_string());
    let Some(capability) = Simulated::parse(&arg) else {
        eprintln!("unknown authenticator `{arg}`; expected allow|cancel|deny|no-hardware|not-enrolled");
        std::process::exit(2);
    };

    let mut service = TodoService::new(Arc::new(SystemClock), capability);
    block_on(run(&mut service));
}

async fn run(service: &mut TodoService<Simulated>) {
    match service
        .add_todo(&TodoInput::new("  Try SecureTodo  ").with_description(" from the CLI "))
        .await
    {
        Gated::Performed(Some(id)) => {
            println!("add status=ok id={id}");
            let toggled = service.toggle_todo_status(id).await.into_option();
            println!("toggle status={}", if toggled == Some(true) { "ok" } else { "skipped" });
        }
        Gated::Performed(None) => println!("add status=rejected reason=blank_title"),
        Gated::NotPerformed(failure) => {
            warn!("event=cli_add module=cli status=not_performed");
            println!(
                "add status=not_performed message=\"{}\" alert={}",
                failure.message(),
                failure.should_alert()
            );
        }
    }

    println!(
        "auth state={} trusted={}",
        service.auth_state().as_str(),
        service.is_trusted()
    );
    let snapshot = service.snapshot();
    println!("snapshot version={} items={}", snapshot.version(), snapshot.items().len());
    for item in snapshot.items().iter() {
        println!("- [{}] {}", item.status, item.title);
    }
}
