//! 커넥터 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 실시간 시세 스트리밍 확인
//! - 과거 캔들 조회
//! - 잔고 및 주문 수량 계산

pub mod commands;
