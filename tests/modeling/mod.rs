//! Model layer and problem adapter tests.

mod model_tests;
