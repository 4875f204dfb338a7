use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{select, Either};

use crate::platform::Timer;

/// Race `fut` against `timer`. `None` means the limit elapsed first and the
/// inner future was dropped.
pub async fn with_timeout<F, T>(timer: &dyn Timer, limit: Duration, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    let fut = pin!(fut);
    let sleep = timer.sleep(limit);
    match select(fut, sleep).await {
        Either::Left((value, _)) => Some(value),
        Either::Right(((), _)) => None,
    }
}
