//! # Connector Core
//!
//! 거래소 커넥터의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 커넥터 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목(Instrument) 및 거래 규칙
//! - 잔고, 시세, 캔들 등 시장/계좌 데이터 구조체
//! - 주문 및 주문 상태 타입
//! - 호가/수량 단위 양자화
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use logging::*;
pub use types::*;
