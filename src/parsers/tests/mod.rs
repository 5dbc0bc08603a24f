mod truncate_tests;
