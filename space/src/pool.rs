/// Objects that can be scrubbed back to a blank state before reuse.
pub trait Resettable {
    fn reset(&mut self);
}

/// Free list of retired objects, capped so a burst of churn cannot pin
/// memory forever. Objects are reset on the way in, never on the way
/// out, so a pooled object is always blank when handed back.
pub struct ObjectPool<T: Resettable> {
    pool: Vec<T>,
    max_size: usize,
}

impl<T: Resettable> ObjectPool<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            pool: Vec::new(),
            max_size,
        }
    }

    pub fn get(&mut self) -> T
    where
        T: Default,
    {
        self.pool.pop().unwrap_or_default()
    }

    pub fn put(&mut self, mut object: T) {
        if self.pool.len() < self.max_size {
            object.reset();
            self.pool.push(object);
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
    }

    impl Resettable for Counter {
        fn reset(&mut self) {
            self.value = 0;
        }
    }

    #[test]
    fn test_put_resets_before_reuse() {
        let mut pool: ObjectPool<Counter> = ObjectPool::new(4);
        let mut c = pool.get();
        c.value = 99;
        pool.put(c);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get().value, 0);
    }

    #[test]
    fn test_capacity_cap() {
        let mut pool: ObjectPool<Counter> = ObjectPool::new(1);
        pool.put(Counter::default());
        pool.put(Counter::default());
        assert_eq!(pool.len(), 1);
    }
}
