//! 敌方队列遮蔽：高关卡下隐藏队尾的手势，开战后全部揭示。

use super::hand::{Hand, Queue};

pub fn masked_count(level: u32, mask_from_level: u32, queue_len: usize) -> usize {
    if level < mask_from_level {
        return 0;
    }
    let hidden = (level - mask_from_level + 1) as usize;
    hidden.min(queue_len)
}

pub fn mask_queue(level: u32, mask_from_level: u32, enemy: &Queue) -> Queue {
    let hidden = masked_count(level, mask_from_level, enemy.len());
    let visible = enemy.len() - hidden;
    enemy
        .iter()
        .enumerate()
        .map(|(index, hand)| if index < visible { *hand } else { Hand::Masked })
        .collect()
}
