pub mod error;
pub mod readiness;
pub mod team;
pub mod worker;

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use crate::engine::testing::{checkin, date, engine_with, manila_monday, manila_week, time};
    use crate::routes;

    macro_rules! app {
        ($source:expr) => {{
            let (engine, _) = engine_with($source, manila_monday());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(engine))
                    .service(web::scope("/api/v1").configure(routes::v1)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn performance_endpoint_reports_score_and_grade() {
        let app = app!(manila_week());
        let req = test::TestRequest::get()
            .uri("/api/v1/workers/1/performance?start=2025-01-06&end=2025-01-10")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["score"], 66.7);
        assert_eq!(body["grade"], "D+");
        assert_eq!(body["breakdown"]["counted_days"], 3);
    }

    #[actix_web::test]
    async fn attendance_endpoint_serializes_date_keys() {
        let app = app!(manila_week());
        let req = test::TestRequest::get()
            .uri("/api/v1/workers/1/attendance?start=2025-01-06&end=2025-01-10")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0]["date"], "2025-01-06");
        assert_eq!(records[0]["status"], "GREEN");
        assert_eq!(records[1]["status"], "ABSENT");
        assert_eq!(records[3]["reason"], "HOLIDAY");
        assert_eq!(records[4]["reason"], "APPROVED_LEAVE");
    }

    #[actix_web::test]
    async fn malformed_and_inverted_ranges_are_bad_requests() {
        let app = app!(manila_week());

        let req = test::TestRequest::get()
            .uri("/api/v1/workers/1/performance?start=2025-1-6&end=2025-01-10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/v1/teams/10/grade?start=2025-01-10&end=2025-01-06")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("end precedes start"));
    }

    #[actix_web::test]
    async fn unknown_worker_is_not_found() {
        let app = app!(manila_week());
        let req = test::TestRequest::get().uri("/api/v1/workers/99/streak").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn upstream_failure_is_hidden_behind_500() {
        let mut source = manila_week();
        source.failing = Some("fetch_holidays");
        let app = app!(source);

        let req = test::TestRequest::get()
            .uri("/api/v1/workers/1/attendance?start=2025-01-06&end=2025-01-10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Internal Server Error" }));
    }

    #[actix_web::test]
    async fn anomalies_endpoint_accepts_as_of() {
        let mut source = manila_week();
        for day in 2..=5 {
            source.checkins.push(checkin(1, date(2025, 1, day), time(7, 50), 90.0));
        }
        source.checkins.push(checkin(1, date(2025, 1, 6), time(7, 50), 55.0));
        let app = app!(source);

        let req = test::TestRequest::get()
            .uri("/api/v1/teams/10/anomalies?as_of=2025-01-06")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["as_of"], "2025-01-06");
        assert_eq!(body["data"][0]["worker_id"], 1);
        assert_eq!(body["data"][0]["severity"], "critical");

        let req = test::TestRequest::get()
            .uri("/api/v1/teams/10/anomalies?as_of=tomorrow")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn readiness_evaluation_validates_the_scale() {
        let app = app!(manila_week());

        let req = test::TestRequest::post()
            .uri("/api/v1/readiness/evaluate")
            .set_json(json!({ "mood": 10, "stress": 1, "sleep": 10, "physical": 10 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["score"], 100.0);
        assert_eq!(body["status"], "GREEN");

        let req = test::TestRequest::post()
            .uri("/api/v1/readiness/evaluate")
            .set_json(json!({ "mood": 0, "stress": 1, "sleep": 10, "physical": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
