use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, Updater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A manual side effect dispatched through [`crate::StateCtx`].
///
/// Commands are enqueued explicitly (`ctx.enqueue_command::<T>()`), spawned by
/// `ctx.flush_commands()`, and publish their results through the [`Updater`].
/// The snapshot is taken at dispatch time; a command must not assume the live
/// context still matches it when the response arrives.
///
/// `cancel` is triggered on [`crate::StateCtx::shutdown`]; a command that
/// races its IO against `cancel.cancelled()` exits without side effect when
/// the owning view is torn down.
pub trait Command: Send + Sync + 'static {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture;
}
