/// Unit tests exercising the public API without a running server
mod basic_tests;
