pub mod builders;
pub mod db;

pub use builders::{AccountBuilder, PropertyBuilder, TenancyBuilder, UnitBuilder};
pub use db::TestDb;

use quarters::notify::{LogNotifier, Notifier};
use quarters::settings::Notifications;
use std::sync::Arc;

pub fn log_notifier() -> Arc<dyn Notifier> {
    Arc::new(LogNotifier)
}

pub fn notify_cfg() -> Notifications {
    Notifications {
        frontend_base_url: "http://localhost:3000".to_string(),
        from_address: "Quarters <noreply@example.com>".to_string(),
    }
}
