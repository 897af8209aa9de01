//! QWeather status codes and the localized messages shown for weather errors.
//!
//! Reference: https://dev.qweather.com/docs/resource/status-code/

use todaydo_core::Language;

use crate::types::{Phase, WeatherError};

/// Success code in every QWeather envelope
pub const CODE_OK: &str = "200";

/// Message for a known status code, `None` for codes outside the table.
pub fn known_status_message(code: &str, lang: Language) -> Option<&'static str> {
    let msg = match (code, lang) {
        ("200", Language::Ko) => "요청 성공",
        ("200", Language::En) => "Request succeeded",
        ("204", Language::Ko) => "요청 성공하였으나 해당 지역의 데이터가 없습니다",
        ("204", Language::En) => "Request succeeded but there is no data for this location",
        ("400", Language::Ko) => "요청 파라미터가 잘못되었습니다",
        ("400", Language::En) => "Invalid request parameters",
        ("401", Language::Ko) => "API 인증 실패 - API 키를 확인해주세요",
        ("401", Language::En) => "API authentication failed - please check your API key",
        ("402", Language::Ko) => "API 사용량 초과 또는 잔액 부족",
        ("402", Language::En) => "API quota exceeded or insufficient balance",
        ("403", Language::Ko) => "접근이 거부되었습니다",
        ("403", Language::En) => "Access denied",
        ("404", Language::Ko) => "요청한 데이터를 찾을 수 없습니다",
        ("404", Language::En) => "Requested data not found",
        ("429", Language::Ko) => "API 호출 한도를 초과했습니다. 잠시 후 다시 시도해주세요",
        ("429", Language::En) => "API rate limit exceeded. Please try again later",
        ("500", Language::Ko) => "QWeather 서버 내부 오류",
        ("500", Language::En) => "QWeather internal server error",
        _ => return None,
    };
    Some(msg)
}

/// Message for any status code; unknown codes get a templated message.
pub fn status_message(code: &str, lang: Language) -> String {
    match known_status_message(code, lang) {
        Some(msg) => msg.to_string(),
        None => match lang {
            Language::Ko => format!("알 수 없는 오류 (코드: {})", code),
            Language::En => format!("Unknown error (code: {})", code),
        },
    }
}

impl WeatherError {
    /// Message suitable for the weather widget, in the interface language.
    pub fn user_message(&self, lang: Language) -> String {
        match (self, lang) {
            (Self::Api { code, .. }, _) => status_message(code, lang),
            (Self::NotConfigured, Language::Ko) => {
                "QWeather API 키가 설정되지 않았습니다. 설정에서 추가해주세요".to_string()
            }
            (Self::NotConfigured, Language::En) => {
                "QWeather API key is not configured. Please add it in Settings.".to_string()
            }
            (Self::EmptyLocation, Language::Ko) => "위치를 입력해주세요".to_string(),
            (Self::EmptyLocation, Language::En) => "Please enter a location".to_string(),
            (Self::Http { phase, status }, Language::Ko) => match phase {
                Phase::Geocode => format!("위치 검색 HTTP 오류: {}", status),
                Phase::Observation => format!("날씨 API HTTP 오류: {}", status),
            },
            (Self::Http { phase, status }, Language::En) => {
                format!("{} HTTP error: {}", phase, status)
            }
            (Self::Network { .. }, Language::Ko) => {
                "날씨 정보를 가져오는 중 네트워크 오류가 발생했습니다".to_string()
            }
            (Self::Network { .. }, Language::En) => {
                "Network error while fetching weather. Check your connection.".to_string()
            }
            (Self::Decode { phase, .. }, Language::Ko) => match phase {
                Phase::Geocode => "위치 검색 응답 형식이 올바르지 않습니다".to_string(),
                Phase::Observation => "날씨 API 응답 형식이 올바르지 않습니다".to_string(),
            },
            (Self::Decode { phase, .. }, Language::En) => {
                format!("{} sent a response that could not be read", phase)
            }
            (Self::LocationNotFound(input), Language::Ko) => format!(
                "'{}' 위치를 찾을 수 없습니다. 다른 도시 이름이나 좌표를 시도해주세요",
                input
            ),
            (Self::LocationNotFound(input), Language::En) => format!(
                "Location '{}' not found. Try a different city name or coordinates",
                input
            ),
            (Self::NoData, Language::Ko) => "응답에 날씨 데이터가 없습니다".to_string(),
            (Self::NoData, Language::En) => "The response contained no weather data".to_string(),
            (Self::InvalidField { field, .. }, Language::Ko) => {
                format!("날씨 데이터 형식이 올바르지 않습니다 ({})", field)
            }
            (Self::InvalidField { field, .. }, Language::En) => {
                format!("Malformed weather data ({})", field)
            }
            (Self::Store(_), Language::Ko) => "날씨 데이터를 저장하지 못했습니다".to_string(),
            (Self::Store(_), Language::En) => "Failed to save weather data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_in_both_languages() {
        for code in ["200", "204", "400", "401", "402", "403", "404", "429", "500"] {
            assert!(known_status_message(code, Language::Ko).is_some(), "ko {}", code);
            assert!(known_status_message(code, Language::En).is_some(), "en {}", code);
        }
    }

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(
            status_message("401", Language::Ko),
            "API 인증 실패 - API 키를 확인해주세요"
        );
        assert!(status_message("401", Language::En).contains("API key"));
    }

    #[test]
    fn test_unknown_code_is_templated() {
        assert_eq!(status_message("999", Language::Ko), "알 수 없는 오류 (코드: 999)");
        assert_eq!(status_message("999", Language::En), "Unknown error (code: 999)");
    }

    #[test]
    fn test_location_not_found_names_input() {
        let err = WeatherError::LocationNotFound("Atlantis".into());
        assert!(err.user_message(Language::Ko).contains("'Atlantis'"));
        assert!(err.user_message(Language::En).contains("'Atlantis'"));
    }

    #[test]
    fn test_http_error_names_phase() {
        let err = WeatherError::Http {
            phase: Phase::Observation,
            status: 502,
        };
        assert_eq!(err.user_message(Language::En), "Weather API HTTP error: 502");
    }
}
