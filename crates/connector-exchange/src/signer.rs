//! 요청 파라미터 HMAC-SHA256 서명.
//!
//! 파라미터는 호출자가 넣은 순서 그대로 `key=value`를 `&`로 이어 붙인
//! URL 인코딩 문자열로 직렬화되며, 서명은 이 문자열에 대해 계산됩니다.
//! 순서를 정렬하지 않는다는 점이 거래소의 정규 인코딩과 일치하는 조건입니다.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// 순서가 유지되는 요청 파라미터 목록.
pub type Params = Vec<(&'static str, String)>;

/// 공유 시크릿으로 요청 파라미터에 서명합니다.
#[derive(Clone)]
pub struct RequestSigner {
    secret: SecretString,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"***REDACTED***")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// 파라미터를 삽입 순서대로 URL 인코딩합니다.
    pub fn encode<K, V>(params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }
        serializer.finish()
    }

    /// 인코딩된 쿼리 문자열에 서명하고 hex 문자열을 반환합니다.
    pub fn sign_query(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 파라미터 목록에 서명합니다.
    pub fn sign<K, V>(&self, params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.sign_query(&Self::encode(params))
    }
}
