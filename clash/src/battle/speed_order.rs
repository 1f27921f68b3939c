use std::cmp::Ordering;

use clash_prng::{
    PseudoRandomNumberGenerator,
    rand_util,
};

/// An object that can be ordered by speed.
pub trait SpeedOrderable {
    /// Order. Lowest order goes first.
    fn order(&self) -> u32;
    /// Priority. Highest priority goes first.
    fn priority(&self) -> i32;
    /// Speed. Highest speed goes first.
    fn speed(&self) -> i64;
}

impl<T> SpeedOrderable for &'_ T
where
    T: SpeedOrderable,
{
    #[inline]
    fn order(&self) -> u32 {
        (*self).order()
    }
    #[inline]
    fn priority(&self) -> i32 {
        (*self).priority()
    }
    #[inline]
    fn speed(&self) -> i64 {
        (*self).speed()
    }
}

/// Compares the priority of two objects.
pub fn compare_priority<T>(a: &T, b: &T) -> Ordering
where
    T: SpeedOrderable,
{
    // Lower order first.
    a.order().cmp(&b.order()).then_with(|| {
        // Higher priority first.
        b.priority()
            .cmp(&a.priority())
            // Higher speed first.
            .then_with(|| b.speed().cmp(&a.speed()))
    })
}

/// Sorts the given items by speed.
///
/// Items are shuffled first and then stably sorted, so equal items land in a random order that
/// only depends on the generator's state.
pub fn speed_sort<T>(items: &mut [T], prng: &mut dyn PseudoRandomNumberGenerator)
where
    T: SpeedOrderable,
{
    rand_util::shuffle(prng, items);
    items.sort_by(compare_priority);
}

#[cfg(test)]
mod speed_order_test {
    use clash_prng::RealPseudoRandomNumberGenerator;
    use pretty_assertions::assert_eq;

    use crate::battle::{
        SpeedOrderable,
        speed_sort,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        name: &'static str,
        tag: usize,
        order: u32,
        priority: i32,
        speed: i64,
    }

    impl SpeedOrderable for Entry {
        fn order(&self) -> u32 {
            self.order
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn speed(&self) -> i64 {
            self.speed
        }
    }

    fn entry(name: &'static str, order: u32, priority: i32, speed: i64) -> Entry {
        Entry {
            name,
            tag: 0,
            order,
            priority,
            speed,
        }
    }

    #[test]
    fn sorts_by_order_then_priority_then_speed() {
        let mut prng = RealPseudoRandomNumberGenerator::new(Some(1));
        let mut items = vec![
            entry("slow", 3, 0, 10),
            entry("fast", 3, 0, 100),
            entry("quick", 3, 1, 1),
            entry("switch", 2, 0, 0),
            entry("reversed", 3, 0, -200),
        ];
        speed_sort(&mut items, &mut prng);
        assert_eq!(
            items.iter().map(|item| item.name).collect::<Vec<_>>(),
            vec!["switch", "quick", "fast", "slow", "reversed"]
        );
    }

    #[test]
    fn ties_depend_only_on_seed() {
        let items = (0..8)
            .map(|_| entry("tie", 3, 0, 50))
            .enumerate()
            .map(|(i, mut item)| {
                item.tag = i;
                item.speed = 50 + (i as i64 % 2);
                item
            })
            .collect::<Vec<_>>();
        let sorted = |seed| {
            let mut prng = RealPseudoRandomNumberGenerator::new(Some(seed));
            let mut items = items.clone();
            speed_sort(&mut items, &mut prng);
            items
        };
        assert_eq!(sorted(7), sorted(7));
        assert!(sorted(7).iter().take(4).all(|item| item.speed == 51));
    }
}
