/// Letter designation for a stop: `A`..`Z`, then `AA`, `AB`, ...
///
/// Presentation only; the journey itself never stores labels.
pub fn stop_label(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
