//! 有界缓存 - 类别查询的插入序淘汰缓存
//!
//! 容量固定，超出时淘汰最早插入的条目。淘汰策略不影响正确性，
//! 未命中直接回源语料快照重取。

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// 默认缓存容量
pub const DEFAULT_CAPACITY: usize = 100;

/// 插入序淘汰的有界缓存
pub struct BoundedCache<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    /// 指定容量创建（容量 0 视为 1）
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 默认容量创建
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// 查询
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    /// 插入，满时淘汰最早的条目
    pub fn insert(&mut self, key: K, value: V) {
        if self.map.insert(key.clone(), value).is_some() {
            // 覆盖已有键不改变插入顺序
            return;
        }

        self.order.push_back(key);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
    }

    /// 清空（语料重载后调用）
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache: BoundedCache<String, u32> = BoundedCache::new(10);
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_capacity_bound() {
        let mut cache: BoundedCache<u32, u32> = BoundedCache::new(3);
        for i in 0..10 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_insertion_order_eviction() {
        let mut cache: BoundedCache<u32, u32> = BoundedCache::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);

        // 最早插入的 1 被淘汰
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(2));
        assert_eq!(cache.get(&3), Some(3));
    }

    #[test]
    fn test_overwrite_keeps_len() {
        let mut cache: BoundedCache<u32, u32> = BoundedCache::new(5);
        cache.insert(1, 1);
        cache.insert(1, 100);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1), Some(100));
    }

    #[test]
    fn test_clear() {
        let mut cache: BoundedCache<u32, u32> = BoundedCache::new(5);
        cache.insert(1, 1);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut cache: BoundedCache<u32, u32> = BoundedCache::new(0);
        cache.insert(1, 1);
        assert_eq!(cache.get(&1), Some(1));
    }
}
