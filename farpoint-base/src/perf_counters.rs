use std::sync::atomic::AtomicU64;

pub static GLOBAL_DISTANCE_COUNT: AtomicU64 = AtomicU64::new(0);
pub static GLOBAL_KERNEL_EVAL_COUNT: AtomicU64 = AtomicU64::new(0);

/// The inner loops touch every candidate once per step, so counts arrive in
/// batches of n rather than one increment per evaluation.
pub fn add_distance_count(n: u64) {
    GLOBAL_DISTANCE_COUNT.fetch_add(n, std::sync::atomic::Ordering::SeqCst);
}

pub fn add_kernel_eval_count(n: u64) {
    GLOBAL_KERNEL_EVAL_COUNT.fetch_add(n, std::sync::atomic::Ordering::SeqCst);
}

/// gets the value of the counter, and sets the value to 0.
/// if multiple threads read this concurrently, they will all get 0 except the first one,
/// assuming the counter is not incremented in-between
pub fn distance_count() -> u64 {
    GLOBAL_DISTANCE_COUNT.fetch_and(0, std::sync::atomic::Ordering::SeqCst)
}

pub fn kernel_eval_count() -> u64 {
    GLOBAL_KERNEL_EVAL_COUNT.fetch_and(0, std::sync::atomic::Ordering::SeqCst)
}
