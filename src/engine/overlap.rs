/// Do the half-open day ranges `[a_start, a_start + a_duration)` and
/// `[b_start, b_start + b_duration)` share at least one day?
///
/// Ranges that only touch at an endpoint do not overlap.
pub fn overlaps(a_start: u32, a_duration: u32, b_start: u32, b_duration: u32) -> bool {
    let a_end = a_start as u64 + a_duration as u64;
    let b_end = b_start as u64 + b_duration as u64;
    (a_start as u64) < b_end && (b_start as u64) < a_end
}
