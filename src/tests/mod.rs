//! Cross-module tests


mod codec_tests;
