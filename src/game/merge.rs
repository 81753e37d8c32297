use super::chain::ChainController;
use super::constants::SWAP_MOVE_SECS;
use super::types::ChainEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merges: usize,
    pub swaps: usize,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.merges == 0 && self.swaps == 0
    }
}

impl ChainController {
    /// Walks adjacent pairs from the tail toward the head once. Equal
    /// neighbours fold into the one nearer the head; a larger value behind a
    /// smaller one trades places with it, so one pass can carry a large value
    /// several places forward while leaving others for the next pass. Skipped
    /// while an absorption is in flight.
    pub fn merge_pass(&mut self) -> MergeReport {
        let mut report = MergeReport::default();
        if self.chain.len() < 2 || self.merging {
            return report;
        }

        let mut index = self.chain.len() - 1;
        while index > 0 {
            let current = self.chain[index].value;
            let previous = self.chain[index - 1].value;

            if current == previous {
                let Some(doubled) = previous.checked_mul(2) else {
                    index -= 1;
                    continue;
                };
                let pinned = self.pinned(self.chain[index - 1].position, doubled);
                let survivor = &mut self.chain[index - 1];
                survivor.value = doubled;
                survivor.position = pinned;
                let consumed = self.chain.remove(index);
                self.motion.cancel(consumed.id);
                self.refresh_offsets();
                tracing::debug!(
                    value = doubled,
                    consumed = consumed.id.0,
                    length = self.chain.len(),
                    "segments merged"
                );
                self.events.emit(ChainEvent::Merged { value: doubled });
                let head = self.head_id();
                self.events.emit(ChainEvent::HeadChanged { head });
                report.merges += 1;
            } else if current > previous {
                let ahead = self.chain[index - 1].position;
                let behind = self.chain[index].position;
                self.chain.swap(index - 1, index);
                self.refresh_offsets();

                let moved_up = &self.chain[index - 1];
                let (up_id, up_from, up_value) = (moved_up.id, moved_up.position, moved_up.value);
                let moved_down = &self.chain[index];
                let (down_id, down_from, down_value) =
                    (moved_down.id, moved_down.position, moved_down.value);
                let up_target = self.pinned(ahead, up_value);
                let down_target = self.pinned(behind, down_value);
                self.motion
                    .start(up_id, up_from, up_target, SWAP_MOVE_SECS, None);
                self.motion
                    .start(down_id, down_from, down_target, SWAP_MOVE_SECS, None);
                tracing::debug!(up = up_value, down = down_value, index, "segments reordered");
                if index == 1 {
                    let head = self.head_id();
                    self.events.emit(ChainEvent::HeadChanged { head });
                }
                report.swaps += 1;
            }
            index -= 1;
        }
        report
    }
}
