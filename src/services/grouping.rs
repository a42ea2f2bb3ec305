use crate::models::Slot;

/// Splits requested slots into blocks that each become one booking.
///
/// Slots are sorted first. A slot joins the running block when it starts
/// exactly where the previous one ended, or (with a non-zero buffer) exactly
/// one buffer after it.
pub fn group(slots: &[Slot], buffer_minutes: i32) -> Vec<Vec<Slot>> {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut blocks: Vec<Vec<Slot>> = vec![];
    let mut current: Vec<Slot> = vec![];

    for slot in sorted {
        let continues = current.last().is_some_and(|prev| {
            prev.end == slot.start
                || (buffer_minutes > 0 && prev.end.minutes() + buffer_minutes == slot.start.minutes())
        });
        if !continues && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(slot);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

pub fn flatten(blocks: &[Vec<Slot>]) -> Vec<Slot> {
    blocks.iter().flatten().copied().collect()
}

/// The interval a block books: first start to last end.
pub fn block_span(block: &[Slot]) -> Option<Slot> {
    let first = block.first()?;
    let last = block.last()?;
    Some(Slot::new(first.start, last.end))
}
