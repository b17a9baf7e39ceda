use indicatif::ProgressBar;

/// Wrap an iterator with a progress bar ticking once per item.
/// The identity when disabled.
pub fn report_progress<I>(iter: I, enabled: bool) -> Box<dyn Iterator<Item = I::Item>>
where
    I: ExactSizeIterator + 'static,
{
    if enabled {
        let pb = ProgressBar::new(iter.len() as u64);
        Box::new(pb.wrap_iter(iter))
    } else {
        Box::new(iter)
    }
}

#[test]
fn test_disabled_progress_is_identity() {
    let collected: Vec<usize> = report_progress(0..5, false).collect();
    assert_eq!(collected, vec![0, 1, 2, 3, 4]);
}
