mod debounce_tests;
