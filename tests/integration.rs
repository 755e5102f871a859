// Integration tests module

mod integration {
    mod support;

    mod classify_test;
    mod config_test;
    mod runtime_test;
}
