pub mod allocator;
pub mod render_context;
pub mod texture_manager;

#[macro_export]
macro_rules! enter_span {
    ($level:expr, $name:expr, $($fields:tt)*) => {
        let span = tracing::span!($level, $name, $($fields)*);
        let _enter = span.enter();
    };

    ($level:expr, $name:expr) => {
        $crate::enter_span!($level, $name,)
    };
}
