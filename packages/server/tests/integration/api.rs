use crate::common::{TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::API_APPS).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"].as_u64().unwrap(), 0);
        assert_eq!(res.body["apps"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn listing_returns_every_app_newest_id_first() {
        let app = TestApp::spawn().await;
        app.host_app("alpha-1.0.0", b"aaa").await;
        app.host_app("beta-2.1.3", b"bbb").await;
        app.host_app("gamma", b"ccc").await;

        let res = app.get(routes::API_APPS).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"].as_u64().unwrap(), 3);

        let names: Vec<&str> = res.body["apps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["gamma", "beta-2.1.3", "alpha-1.0.0"]);
    }

    #[tokio::test]
    async fn listing_parses_versions_out_of_ids() {
        let app = TestApp::spawn().await;
        app.host_app("demo-1.0.0", b"zip bytes").await;
        app.host_app("no-version-here", b"more bytes").await;

        let res = app.get(routes::API_APPS).await;
        let apps = res.body["apps"].as_array().unwrap();

        let demo = apps
            .iter()
            .find(|a| a["name"] == "demo-1.0.0")
            .expect("demo app should be listed");
        assert_eq!(demo["version"].as_str().unwrap(), "1.0.0");

        let plain = apps
            .iter()
            .find(|a| a["name"] == "no-version-here")
            .expect("versionless app should be listed");
        assert!(plain["version"].is_null());
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn detail_returns_full_metadata() {
        let app = TestApp::spawn().await;
        let res = app
            .upload_app(
                "tool-0.3.1",
                "a useful tool",
                Some(("tool.zip", b"tool bytes".to_vec())),
                None,
                Some("bob"),
            )
            .await;
        assert_eq!(res.status, 303);

        let res = app.get(&routes::api_app("tool-0.3.1")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"].as_str().unwrap(), "tool-0.3.1");
        assert_eq!(res.body["description"].as_str().unwrap(), "a useful tool");
        assert_eq!(res.body["download_count"].as_i64().unwrap(), 0);
        assert_eq!(res.body["owner"].as_str().unwrap(), "bob");
        assert_eq!(res.body["version"].as_str().unwrap(), "0.3.1");
        assert!(res.body["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_id_is_a_structured_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::api_app("missing")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"].as_str().unwrap(), "NOT_FOUND");
        assert!(res.body["message"].as_str().unwrap().contains("missing"));
    }
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let res = app.get("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/v1/apps"].is_object());
}
