// ==========================================
// 集成测试共享 Mock
// ==========================================

#![allow(dead_code)]

pub mod mock_config;
pub mod mock_submitter;
