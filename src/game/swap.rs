use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// 待交换的玩家槽位，最多两个，第三次选择会挤掉最早的一个。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapSelection {
    picked: VecDeque<usize>,
}

impl SwapSelection {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(pos) = self.picked.iter().position(|picked| *picked == index) {
            self.picked.remove(pos);
            return;
        }
        if self.picked.len() == Self::CAPACITY {
            self.picked.pop_front();
        }
        self.picked.push_back(index);
    }

    pub fn pair(&self) -> Option<(usize, usize)> {
        match (self.picked.front(), self.picked.get(1)) {
            (Some(first), Some(second)) if self.picked.len() == Self::CAPACITY => {
                Some((*first, *second))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.picked.contains(&index)
    }

    pub fn indices(&self) -> Vec<usize> {
        self.picked.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.picked.clear();
    }

    /// 反序列化得到的选择可能越界或重复，恢复会话前用它校验。
    pub fn fits(&self, queue_len: usize) -> bool {
        let distinct = self
            .picked
            .iter()
            .enumerate()
            .all(|(pos, index)| !self.picked.iter().skip(pos + 1).any(|other| other == index));
        self.picked.len() <= Self::CAPACITY
            && distinct
            && self.picked.iter().all(|index| *index < queue_len)
    }
}
