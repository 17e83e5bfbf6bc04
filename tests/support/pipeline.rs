use std::sync::Arc;

use oceanus::application::pipeline::{AnalysisRequest, Dashboard, Pipeline};
use oceanus::port::ActivitySource;
use oceanus::testkit::settings::default_settings;

pub fn pipeline(source: impl ActivitySource + 'static) -> Pipeline {
    Pipeline::new(Arc::new(source), default_settings())
}

pub fn request(start: &str, end: &str) -> AnalysisRequest {
    AnalysisRequest {
        start: Some(start.to_string()),
        end: Some(end.to_string()),
        ..AnalysisRequest::default()
    }
}

pub async fn run(source: impl ActivitySource + 'static, request: &AnalysisRequest) -> Dashboard {
    pipeline(source).run(request).await
}
