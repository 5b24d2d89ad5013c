/// Status readout line: current turn, both bases' hit points, poll rate.
/// HP can arrive negative from overshooting damage; the display clamps it,
/// the snapshot keeps the wire value.
pub fn format_status(tick: u64, base_a_hp: i32, base_b_hp: i32, fps: u32) -> String {
    format!(
        "turn {tick} | base A hp {} | base B hp {} | fps {fps}",
        base_a_hp.max(0),
        base_b_hp.max(0)
    )
}
