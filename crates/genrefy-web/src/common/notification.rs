use std::rc::Rc;

use crate::{common::Toast, utils::window};

/// Surface for short user-facing messages.
pub trait NotificationSink {
    fn notify(&self, message: &str);
}

/// Blocking `window.alert`, used when no toast surface is mounted.
pub struct AlertSink;

impl NotificationSink for AlertSink {
    fn notify(&self, message: &str) {
        if let Err(e) = window().alert_with_message(message) {
            error!("failed to show alert: {:?}", e);
        }
    }
}

/// Drops messages after logging them.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }
}

impl NotificationSink for Toast {
    fn notify(&self, message: &str) {
        self.show(message.to_string());
    }
}

pub fn select(toast: Option<Rc<Toast>>) -> Rc<dyn NotificationSink> {
    match toast {
        Some(toast) => toast as Rc<dyn NotificationSink>,
        None => {
            debug!("toast unavailable, falling back to alert");
            Rc::new(AlertSink)
        }
    }
}

#[cfg(test)]
pub mod test {
    use std::cell::RefCell;

    use super::NotificationSink;

    #[derive(Default)]
    pub struct RecordingSink {
        pub messages: RefCell<Vec<String>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }
}
