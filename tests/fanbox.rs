//! FANBOX client tests against a local mock server.

use futures::TryStreamExt;
use serde_json::{json, Value};
use subscrforge_collector::config::{CacheSetting, ClientConfig};
use subscrforge_collector::models::SegmentKind;
use subscrforge_collector::{Error, Fanbox, FanboxClient, Price};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_ID: &str = "123_abc";

fn metadata_page(user: Value) -> String {
    let metadata = json!({ "context": { "user": user } }).to_string();
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><meta name="metadata" content="{}"></head><body></body></html>"#,
        metadata.replace('"', "&quot;")
    )
}

fn client(server: &MockServer) -> FanboxClient {
    let api = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    let web = Url::parse(&format!("{}/", server.uri())).unwrap();
    let config = ClientConfig {
        cache: CacheSetting::Enabled(false),
        rate_limit: "100 req/s".to_string(),
        ..ClientConfig::default()
    };
    FanboxClient::new(Fanbox::new(SESSION_ID).with_base_urls(api, web), &config).unwrap()
}

async fn mount_signed_in(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "FANBOXSESSID=123_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(metadata_page(json!({
            "userId": "42",
            "name": "Reader",
            "iconUrl": "https://pixiv.pximg.net/icon.png"
        }))))
        .mount(server)
        .await;
}

async fn connected(server: &MockServer) -> FanboxClient {
    mount_signed_in(server).await;
    let mut client = client(server);
    client.connect().await.unwrap();
    client
}

fn post_json(id: &str, body: Value) -> Value {
    json!({
        "id": id,
        "title": format!("Post {}", id),
        "creatorId": "creator",
        "type": "article",
        "body": body,
        "publishedDatetime": "2024-01-15T12:00:00+09:00",
        "updatedDatetime": "2024-01-16T12:00:00+09:00",
        "isRestricted": false,
        "hasAdultContent": false
    })
}

#[tokio::test]
async fn test_connect_retrieves_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("origin", server.uri().as_str()))
        .and(header("cookie", "FANBOXSESSID=123_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(metadata_page(json!({
            "userId": "42",
            "name": "Reader"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert!(!client.is_connected());

    let user = client.connect().await.unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.name, "Reader");
    assert_eq!(user.client_name(), "Fanbox");

    assert!(client.is_connected());
    assert_eq!(client.user().unwrap().id, "42");

    client.close();
    assert!(!client.is_connected());
    assert!(matches!(client.user(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_connect_with_angle_bracket_in_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(metadata_page(json!({
            "userId": "42",
            "name": "a>b <3"
        }))))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let user = client.connect().await.unwrap();
    assert_eq!(user.name, "a>b <3");
}

#[tokio::test]
async fn test_connect_without_signed_in_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(metadata_page(Value::Null)))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, Error::RetrieveUser { .. }));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_connect_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, Error::RetrieveUser { .. }));
}

#[tokio::test]
async fn test_sub_clients_require_connection() {
    let server = MockServer::start().await;
    let client = client(&server);

    assert!(matches!(client.posts(), Err(Error::NotConnected)));
    assert!(matches!(client.creators(), Err(Error::NotConnected)));
    assert!(matches!(client.plans(), Err(Error::NotConnected)));
    assert!(matches!(client.newsletters(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_get_post_with_article_body() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/post.info"))
        .and(query_param("postId", "1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": post_json("1001", json!({
                "blocks": [
                    {"type": "header", "text": "Hi"},
                    {"type": "p", "text": "bold text", "styles": [{"type": "bold", "offset": 0, "length": 4}]},
                    {"type": "image", "imageId": "i1"}
                ],
                "imageMap": {
                    "i1": {
                        "id": "i1",
                        "extension": "png",
                        "originalUrl": "https://downloads.fanbox.cc/images/post/1001/i1.png",
                        "thumbnailUrl": "https://downloads.fanbox.cc/images/post/1001/w/1200/i1.jpeg"
                    }
                }
            }))
        })))
        .expect(1)
        .mount(&server)
        .await;

    let post = client.posts().unwrap().get("1001").await.unwrap().unwrap();
    assert_eq!(post.id, "1001");
    assert_eq!(post.title, "Post 1001");
    assert_eq!(post.creator, "creator");
    assert!(post.is_privileged);
    assert_eq!(post.body.len(), 3);
    assert_eq!(post.body.of_kind(SegmentKind::Paragraph).len(), 2);
    assert_eq!(post.body.images().len(), 1);

    let html = post.body.render();
    assert!(html.contains("<h2>Hi</h2>"));
    assert!(html.contains("<b>bold</b> text"));
    assert!(html.contains("i1.png"));
}

#[tokio::test]
async fn test_missing_post_is_none() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/post.info"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.posts().unwrap().get("404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_propagated() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/creator.get"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.creators().unwrap().get("creator").await.unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status == 500));
}

#[tokio::test]
async fn test_get_creator() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/creator.get"))
        .and(query_param("creatorId", "creator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {
                "creatorId": "creator",
                "user": {"userId": "7", "name": "Creator Name", "iconUrl": null},
                "description": "About me",
                "profileLinks": ["https://twitter.com/creator"],
                "hasAdultContent": true,
                "isFollowed": true,
                "isSupported": false,
                "isStopped": false,
                "hasBoothShop": false
            }
        })))
        .mount(&server)
        .await;

    let creator = client.creators().unwrap().get("creator").await.unwrap().unwrap();
    assert_eq!(creator.id, "creator");
    assert_eq!(creator.name, "Creator Name");
    assert_eq!(creator.homepage.as_str(), "https://www.fanbox.cc/@creator");
    assert!(creator.is_nsfw);
    assert!(creator.is_following);
    assert!(!creator.is_member);
    assert_eq!(creator.profile_links.len(), 1);
}

#[tokio::test]
async fn test_list_plans() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/plan.listCreator"))
        .and(query_param("creatorId", "creator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": [
                {"id": "p1", "title": "Basic", "fee": 500, "creatorId": "creator"},
                {"id": "p2", "title": "Premium", "fee": 1500, "creatorId": "creator", "description": "More"}
            ]
        })))
        .mount(&server)
        .await;

    let plans = client.plans().unwrap().list_by_creator("creator").await.unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].name, "Basic");
    assert_eq!(plans[0].price, Price::new(500, "JPY").unwrap());
    assert_eq!(plans[1].price.to_string(), "¥1,500");
}

#[tokio::test]
async fn test_list_plans_of_missing_creator() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/plan.listCreator"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client
        .creators()
        .unwrap()
        .list_plans("nobody")
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::NotFound(_)));
    assert_eq!(err.to_string(), "Not found: Creator nobody not found.");
}

#[tokio::test]
async fn test_iterate_posts_follows_next_url() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    let next_url = format!(
        "{}/api/post.listCreator?creatorId=creator&maxPublishedDatetime=2024-01-01",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/api/post.listCreator"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {
                "items": [post_json("3", Value::Null), post_json("2", Value::Null)],
                "nextUrl": next_url
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/post.listCreator"))
        .and(query_param("maxPublishedDatetime", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"items": [post_json("1", Value::Null)], "nextUrl": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts: Vec<_> = client
        .posts()
        .unwrap()
        .iterate_by_creator("creator")
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["3", "2", "1"]);
    assert!(posts.iter().all(|p| p.body.is_empty()));
}

#[tokio::test]
async fn test_list_posts_with_body() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/post.listCreator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"items": [post_json("2", Value::Null), post_json("1", Value::Null)]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/post.info"))
        .and(query_param("postId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": post_json("2", json!({"blocks": [{"type": "p", "text": "second"}]}))
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/post.info"))
        .and(query_param("postId", "1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let posts = client
        .posts()
        .unwrap()
        .list_by_creator_with_body("creator")
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "2");
    assert_eq!(posts[0].body.len(), 1);
}

#[tokio::test]
async fn test_newsletters() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/newsletter.list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": [
                {"id": "n1", "creator": {"creatorId": "alice"}, "body": "Hello", "createdAt": "2024-02-01T00:00:00Z", "isRead": true},
                {"id": "n2", "creator": "bob", "createdAt": "2024-02-02T00:00:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let received: Vec<_> = client
        .newsletters()
        .unwrap()
        .iterate_received()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].creator, "alice");
    assert!(received[0].is_read);
    assert_eq!(received[1].creator, "bob");
    assert!(!received[1].is_read);

    let from_bob: Vec<_> = client
        .creators()
        .unwrap()
        .iterate_newsletters("bob")
        .try_collect()
        .await
        .unwrap();
    assert_eq!(from_bob.len(), 1);
    assert_eq!(from_bob[0].id, "n2");
}

#[tokio::test]
async fn test_supporting_plans() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/plan.listSupporting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": [{"id": "p9", "title": "Fan", "fee": 300, "creatorId": "alice"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plans: Vec<_> = client
        .plans()
        .unwrap()
        .iterate_supporting()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].creator, "alice");
    assert_eq!(plans[0].price.to_string(), "¥300");
}

#[tokio::test]
async fn test_get_newsletter() {
    let server = MockServer::start().await;
    let client = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/newsletter.get"))
        .and(query_param("id", "n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"id": "n1", "creator": "alice", "body": "Thanks!", "createdAt": "2024-02-01T00:00:00Z"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/newsletter.get"))
        .and(query_param("id", "gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let newsletters = client.newsletters().unwrap();
    let message = newsletters.get("n1").await.unwrap().unwrap();
    assert_eq!(message.message.as_deref(), Some("Thanks!"));
    assert_eq!(message.client_name(), "Fanbox");
    assert!(newsletters.get("gone").await.unwrap().is_none());
}
