pub mod cookie;

pub mod events;

mod model;
pub use model::*;

pub mod notification;
pub use notification::NotificationSink;

mod sequence;
pub use sequence::{RequestSequence, SequenceMap};

mod toast;
pub use toast::Toast;
