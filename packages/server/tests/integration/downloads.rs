use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use server::entity::user_metadata;

use crate::common::{TestApp, routes};

mod accounting {
    use super::*;

    #[tokio::test]
    async fn download_redirects_to_serve_and_counts_one() {
        let app = TestApp::spawn().await;
        let blob_ref = app.host_app("demo-1.0.0", b"zip bytes").await;

        let res = app.get(&routes::download("demo-1.0.0")).await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location(), routes::serve(&blob_ref));

        let res = app.get(&routes::api_app("demo-1.0.0")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 1);
    }

    #[tokio::test]
    async fn repeated_downloads_accumulate() {
        let app = TestApp::spawn().await;
        app.host_app("popular", b"bytes").await;

        for _ in 0..3 {
            let res = app.get(&routes::download("popular")).await;
            assert_eq!(res.status, 303);
        }

        let res = app.get(&routes::api_app("popular")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 3);
    }

    #[tokio::test]
    async fn concurrent_downloads_never_lose_a_count() {
        let app = TestApp::spawn().await;
        app.host_app("contended", b"bytes").await;

        // Prime the tracking row so both contenders take the update path.
        let path = routes::download("contended");
        let res = app.get(&path).await;
        assert_eq!(res.status, 303);

        let (a, b) = tokio::join!(app.get(&path), app.get(&path));
        assert_eq!(a.status, 303);
        assert_eq!(b.status, 303);

        let res = app.get(&routes::api_app("contended")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 3);
    }

    #[tokio::test]
    async fn hosting_lifecycle_end_to_end() {
        let app = TestApp::spawn().await;
        app.host_app("demo-1.0.0", b"demo zip bytes").await;

        let res = app.get(routes::API_APPS).await;
        let entry = &res.body["apps"][0];
        assert_eq!(entry["name"].as_str().unwrap(), "demo-1.0.0");
        assert_eq!(entry["version"].as_str().unwrap(), "1.0.0");
        assert_eq!(entry["download_count"].as_i64().unwrap(), 0);

        app.get(&routes::download("demo-1.0.0")).await;
        app.get(&routes::download("demo-1.0.0")).await;

        let res = app.get(&routes::api_app("demo-1.0.0")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 2);

        let user = user_metadata::Entity::find_by_id("127.0.0.1")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("anonymous visitor should have a tracking record");
        assert_eq!(user.downloaded_apps, json!(["demo-1.0.0", "demo-1.0.0"]));
    }

    #[tokio::test]
    async fn external_url_apps_redirect_straight_to_the_url() {
        let app = TestApp::spawn().await;
        let upload = app
            .upload_app(
                "external",
                "on a mirror",
                None,
                Some("https://mirror.example.com/pkg.zip"),
                None,
            )
            .await;
        assert_eq!(upload.status, 303);

        let res = app.get(&routes::download("external")).await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location(), "https://mirror.example.com/pkg.zip");

        let res = app.get(&routes::api_app("external")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_app_writes_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::download("missing")).await;
        assert_eq!(res.status, 404);

        let users = user_metadata::Entity::find()
            .count(&app.db)
            .await
            .expect("DB query failed");
        assert_eq!(users, 0);
    }
}

mod tracking {
    use super::*;

    #[tokio::test]
    async fn anonymous_downloads_are_tracked_by_address() {
        let app = TestApp::spawn().await;
        app.host_app("anon-app", b"bytes").await;

        app.get(&routes::download("anon-app")).await;
        app.get(&routes::download("anon-app")).await;

        let user = user_metadata::Entity::find_by_id("127.0.0.1")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("anonymous visitor should have a tracking record");
        assert_eq!(user.downloaded_apps, json!(["anon-app", "anon-app"]));
        assert_eq!(user.ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn logged_in_downloads_are_tracked_by_login_name() {
        let app = TestApp::spawn().await;
        app.host_app("tracked", b"bytes").await;

        let res = app.get_as(&routes::download("tracked"), "erin").await;
        assert_eq!(res.status, 303);

        let user = user_metadata::Entity::find_by_id("erin")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("downloader record should exist");
        assert_eq!(user.downloaded_apps, json!(["tracked"]));

        // Nothing was recorded under the address.
        let by_ip = user_metadata::Entity::find_by_id("127.0.0.1")
            .one(&app.db)
            .await
            .expect("DB query failed");
        assert!(by_ip.is_none());
    }

    #[tokio::test]
    async fn geo_headers_are_recorded_and_cleared() {
        let app = TestApp::spawn().await;
        app.host_app("geo-app", b"bytes").await;

        let res = app
            .get_with_headers(
                &routes::download("geo-app"),
                &[
                    ("x-auth-request-user", "frank"),
                    ("x-geo-country", "DE"),
                    ("x-geo-region", "BE"),
                    ("x-geo-city", "berlin"),
                    ("x-geo-latlong", "52.52,13.405"),
                ],
            )
            .await;
        assert_eq!(res.status, 303);

        let user = user_metadata::Entity::find_by_id("frank")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("downloader record should exist");
        assert_eq!(user.country.as_deref(), Some("DE"));
        assert_eq!(user.city.as_deref(), Some("berlin"));
        assert_eq!(user.geo_point, Some(json!({"lat": 52.52, "lon": 13.405})));

        // A later download without geolocation clears the stored facts.
        let res = app.get_as(&routes::download("geo-app"), "frank").await;
        assert_eq!(res.status, 303);

        let user = user_metadata::Entity::find_by_id("frank")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("downloader record should exist");
        assert!(user.country.is_none());
        assert!(user.geo_point.is_none());
        assert_eq!(user.downloaded_apps, json!(["geo-app", "geo-app"]));
    }

    #[tokio::test]
    async fn malformed_coordinates_are_ignored() {
        let app = TestApp::spawn().await;
        app.host_app("odd-geo", b"bytes").await;

        let res = app
            .get_with_headers(
                &routes::download("odd-geo"),
                &[
                    ("x-auth-request-user", "grace"),
                    ("x-geo-latlong", "not,numbers"),
                ],
            )
            .await;
        assert_eq!(res.status, 303);

        let user = user_metadata::Entity::find_by_id("grace")
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("downloader record should exist");
        assert!(user.geo_point.is_none());
    }
}

mod serving {
    use super::*;

    #[tokio::test]
    async fn serve_streams_the_stored_bytes_with_headers() {
        let app = TestApp::spawn().await;
        let blob_ref = app.host_app("served-app", b"the actual payload").await;

        let res = app
            .client
            .get(app.url(&routes::serve(&blob_ref)))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 200);

        let headers = res.headers().clone();
        assert_eq!(
            headers.get("content-type").unwrap().to_str().unwrap(),
            "application/octet-stream"
        );
        assert_eq!(
            headers.get("content-length").unwrap().to_str().unwrap(),
            "18"
        );
        assert_eq!(
            headers.get("etag").unwrap().to_str().unwrap(),
            format!("\"{blob_ref}\"")
        );
        let cd = headers
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cd.contains("served-app"), "download named after the app");
        assert!(headers.get("cache-control").is_some());

        let bytes = res.bytes().await.unwrap();
        assert_eq!(bytes.as_ref(), b"the actual payload");
    }

    #[tokio::test]
    async fn serve_answers_304_for_a_matching_etag() {
        let app = TestApp::spawn().await;
        let blob_ref = app.host_app("cached-app", b"payload").await;

        let res = app
            .client
            .get(app.url(&routes::serve(&blob_ref)))
            .header("If-None-Match", format!("\"{blob_ref}\""))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 304);
    }

    #[tokio::test]
    async fn serve_unknown_hash_is_a_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::serve(&"0".repeat(64))).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn serve_malformed_ref_is_a_400() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::serve("not-a-hash")).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn serving_does_not_count_as_a_download() {
        let app = TestApp::spawn().await;
        let blob_ref = app.host_app("direct", b"bytes").await;

        app.get(&routes::serve(&blob_ref)).await;
        app.get(&routes::serve(&blob_ref)).await;

        let res = app.get(&routes::api_app("direct")).await;
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 0);
    }
}
