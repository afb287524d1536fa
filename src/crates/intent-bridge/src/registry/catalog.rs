//! Built-in catalogue of free public services

use super::types::{AuthKind, AuthSpec, EndpointSpec, ServiceConfig};
use serde_json::json;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Services registered by [`super::ApiRegistry::with_builtin_catalog`], in
/// registration order.
pub fn builtin_services() -> Vec<(&'static str, ServiceConfig)> {
    vec![
        ("weather", weather()),
        ("news", news()),
        ("currency", currency()),
        ("joke", joke()),
        ("github", github()),
        ("facts", facts()),
        ("dictionary", dictionary()),
        ("ip", ip()),
    ]
}

fn weather() -> ServiceConfig {
    let sample = json!({
        "name": "{location|New York}",
        "main": {"temp": 22, "humidity": 65},
        "weather": [{"description": "partly cloudy"}],
        "wind": {"speed": 10}
    });

    ServiceConfig::new("OpenWeatherMap", "https://api.openweathermap.org/data/2.5")
        .auth(AuthSpec::new(AuthKind::ApiKey, "OPENWEATHER_API_KEY").in_query("appid"))
        .endpoint(
            "GET_weather",
            EndpointSpec::new("GET", "/weather")
                .map("location", "q")
                .map("city", "q")
                .map("place", "q")
                .require("q")
                .default_param("units", "metric")
                .mock(sample.clone())
                .describe("Current conditions for a city"),
        )
        .endpoint(
            "GET_forecast",
            EndpointSpec::new("GET", "/forecast")
                .map("location", "q")
                .map("city", "q")
                .require("q")
                .default_param("units", "metric")
                .mock(sample)
                .describe("Five day forecast for a city"),
        )
}

fn news() -> ServiceConfig {
    let sample = json!({
        "totalResults": 1,
        "articles": [{
            "title": "Breaking: AI Agents Get Secure API Access",
            "description": "IntentBridge enables secure API access for AI agents",
            "source": {"name": "Tech News"},
            "url": "https://example.com"
        }]
    });

    ServiceConfig::new("NewsAPI", "https://newsapi.org/v2")
        .auth(AuthSpec::new(AuthKind::ApiKey, "NEWS_API_KEY").in_query("apiKey"))
        .endpoint(
            "GET_headlines",
            EndpointSpec::new("GET", "/top-headlines")
                .map("country", "country")
                .map("category", "category")
                .map("topic", "q")
                .default_param("country", "us")
                .mock(sample.clone()),
        )
        .endpoint(
            "SEARCH_news",
            EndpointSpec::new("GET", "/everything")
                .map("query", "q")
                .map("topic", "q")
                .map("search", "q")
                .require("q")
                .default_param("sortBy", "popularity")
                .mock(sample),
        )
}

fn currency() -> ServiceConfig {
    ServiceConfig::new("ExchangeRate", "https://api.exchangerate-api.com/v4").endpoint(
        "GET_rate",
        EndpointSpec::new("GET", "/latest/USD")
            .map("from", "base")
            .map("currency", "base")
            .mock(json!({
                "base": "USD",
                "rates": {"EUR": 0.85, "GBP": 0.73, "JPY": 110.5}
            })),
    )
}

fn joke() -> ServiceConfig {
    ServiceConfig::new("JokeAPI", "https://v2.jokeapi.dev").endpoint(
        "GET_joke",
        EndpointSpec::new("GET", "/joke/Any")
            .map("type", "type")
            .map("category", "category")
            .default_param("safe", true)
            .default_param("type", "single")
            .mock(json!({
                "category": "Programming",
                "joke": "Why do programmers prefer dark mode? Because light attracts bugs!"
            })),
    )
}

fn github() -> ServiceConfig {
    ServiceConfig::new("GitHub", "https://api.github.com")
        .auth(AuthSpec::new(AuthKind::Token, "GITHUB_TOKEN").optional())
        .endpoint(
            "GET_user",
            EndpointSpec::new("GET", "/users/{username}")
                .header("Accept", GITHUB_MEDIA_TYPE)
                .map("username", "username")
                .map("user", "username")
                .mock(json!({
                    "login": "{username|octocat}",
                    "type": "User",
                    "public_repos": 42,
                    "followers": 1000
                })),
        )
        .endpoint(
            "GET_repos",
            EndpointSpec::new("GET", "/users/{username}/repos")
                .header("Accept", GITHUB_MEDIA_TYPE)
                .map("username", "username")
                .map("user", "username")
                .default_param("sort", "updated")
                .default_param("per_page", 10)
                .mock(json!([{
                    "name": "hello-world",
                    "description": "My first repository",
                    "stargazers_count": 80,
                    "html_url": "https://github.com/{username|octocat}/hello-world"
                }])),
        )
}

fn facts() -> ServiceConfig {
    ServiceConfig::new("UselessFacts", "https://uselessfacts.jsph.pl").endpoint(
        "GET_fact",
        EndpointSpec::new("GET", "/api/v2/facts/random").default_param("language", "en"),
    )
}

fn dictionary() -> ServiceConfig {
    ServiceConfig::new("DictionaryAPI", "https://api.dictionaryapi.dev/api/v2").endpoint(
        "GET_definition",
        EndpointSpec::new("GET", "/entries/en/{word}")
            .map("word", "word")
            .map("define", "word")
            .map("meaning", "word"),
    )
}

fn ip() -> ServiceConfig {
    ServiceConfig::new("IPGeolocation", "https://ipapi.co").endpoint(
        "GET_location",
        EndpointSpec::new("GET", "/{ip}/json")
            .map("ip", "ip")
            .map("address", "ip"),
    )
}
