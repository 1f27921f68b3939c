mod order_key;

pub use order_key::{
    OrderKey,
    OrderKeyIter,
    OrderKeySequence,
};
