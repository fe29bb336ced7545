pub mod apply;
pub mod chat;
pub mod diff;
pub mod history;
pub mod init;
pub mod publish;

pub use apply::{apply, ApplyArgs};
pub use chat::{chat, ChatArgs};
pub use diff::{diff, DiffArgs};
pub use history::{history, HistoryArgs};
pub use init::{init, InitArgs};
pub use publish::{pages, publish, PagesArgs, PublishArgs};
