///
/// Clock
/// Wall-clock source, whole seconds since the Unix epoch.
///

pub trait Clock {
    fn now_secs(&self) -> u64;
}
