use citycast_core::{AppError, NetworkError, WeatherError};
use citycast_weather::WeatherError as FetchError;

pub fn weather_error(e: &FetchError) -> AppError {
    match e {
        FetchError::Status { status: 404, message } => {
            AppError::Weather(WeatherError::CityNotFound(message.clone()))
        }
        FetchError::Status { status: 401, .. } => AppError::Weather(WeatherError::InvalidApiKey),
        FetchError::Status { status, message } if *status >= 500 => {
            AppError::Network(NetworkError::ServerError {
                status: *status,
                message: message.clone(),
            })
        }
        FetchError::Status { message, .. } => {
            AppError::Weather(WeatherError::ApiError(message.clone()))
        }
        FetchError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s.clone())),
        FetchError::Timeout => AppError::Network(NetworkError::Timeout),
        FetchError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s.clone())),
        FetchError::Task(s) => AppError::Other(anyhow::anyhow!("request task failed: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_city_hint() {
        let err = weather_error(&FetchError::Status {
            status: 404,
            message: "city not found".into(),
        });
        assert_eq!(err.user_message(), "Failed to load data. Check the city name.");
    }

    #[test]
    fn outage_maps_to_network() {
        let err = weather_error(&FetchError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }

    #[test]
    fn connection_failure_hint() {
        let err = weather_error(&FetchError::Network("refused".into()));
        assert!(err.user_message().contains("internet connection"));
    }

    #[test]
    fn timeout_maps_to_retry_hint() {
        let err = weather_error(&FetchError::Timeout);
        assert!(matches!(err, AppError::Network(NetworkError::Timeout)));
        assert_eq!(err.user_message(), "The request timed out. Please try again.");
    }
}
