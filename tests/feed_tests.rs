//! Feed reads, cursor replay, writes and the follow graph, checked against
//! the requests a recording transport captured.

mod common;

use std::sync::Arc;

use activity_feeds::{
    Activity, ApiError, Client, ClientConfig, Error, FeedId, FollowListOption, FollowRelationship,
    ForeignIdTimePair, GetActivitiesOption, NextPage, TargetsUpdate, Time, UnfollowRelationship,
    UpdateActivityRequest,
};
use common::{body_json, client, RecordingTransport, BASE};
use reqwest::Method;
use serde_json::json;

fn feed_id(s: &str) -> FeedId {
    s.parse().unwrap()
}

// -- Reads and pagination ---------------------------------------------------

#[tokio::test]
async fn test_get_activities_encodes_options_after_api_key() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "123").unwrap();
    feed.get_activities(&[GetActivitiesOption::Limit(5), GetActivitiesOption::IdLt("abc".into())])
        .await
        .unwrap();
    assert_eq!(
        transport.last().url.as_str(),
        format!("{BASE}feed/user/123/?api_key=key&limit=5&id_lt=abc")
    );
}

#[tokio::test]
async fn test_next_page_replays_cursor_options() {
    let transport = RecordingTransport::new();
    transport.respond(
        200,
        r#"{"duration":"5ms","next":"/api/v1.0/feed/user/123/?id_lt=a2&limit=2&withOwnReactions=true","results":[{"id":"a1","actor":"u","verb":"v","object":"o"},{"id":"a2","actor":"u","verb":"v","object":"o"}]}"#,
    );
    transport.respond(200, r#"{"duration":"4ms","next":"","results":[{"id":"a3","actor":"u","verb":"v","object":"o"}]}"#);

    let feed = client(&transport).flat_feed("user", "123").unwrap();
    let first = feed.get_activities(&[GetActivitiesOption::Limit(2)]).await.unwrap();
    let second = feed.get_next_page_activities(&first).await.unwrap();

    assert_eq!(second.results[0].id, "a3");
    let expected = feed
        .get_activities(&first.parse_next().unwrap())
        .await
        .unwrap();
    let reqs = transport.requests();
    assert_eq!(reqs[1].url, reqs[2].url);
    assert_eq!(
        reqs[1].url.as_str(),
        format!("{BASE}feed/user/123/?api_key=key&limit=2&id_lt=a2&withOwnReactions=true")
    );
    assert!(expected.results.is_empty());
}

#[tokio::test]
async fn test_next_page_on_last_page_sends_nothing() {
    let transport = RecordingTransport::new();
    transport.respond(200, r#"{"next":"","results":[]}"#);
    let feed = client(&transport).aggregated_feed("aggregated", "1").unwrap();
    let page = feed.get_activities(&[]).await.unwrap();

    let err = feed.get_next_page_activities(&page).await.unwrap_err();
    assert!(matches!(err, Error::MissingNextPage));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_cursor_is_invalid_next_page() {
    let transport = RecordingTransport::new();
    transport.respond(200, r#"{"next":"/feed/user/1/?limit=ten","results":[]}"#);
    let feed = client(&transport).flat_feed("user", "1").unwrap();
    let page = feed.get_activities(&[]).await.unwrap();
    assert!(matches!(feed.get_next_page_activities(&page).await, Err(Error::InvalidNextPage)));
}

#[tokio::test]
async fn test_enriched_read_uses_enrich_prefix() {
    let transport = RecordingTransport::new();
    transport.respond(
        200,
        r#"{"next":"/enrich/feed/timeline/jo/?limit=1&id_lt=x","results":[{"id":"a1","actor":{"id":"jo","name":"Jo"},"verb":"post","object":"SO:post:1","reaction_counts":{"like":1}}]}"#,
    );
    let feed = client(&transport).flat_feed("timeline", "jo").unwrap();
    let page = feed
        .get_enriched_activities(&[GetActivitiesOption::Limit(1), GetActivitiesOption::EnrichReactionCounts])
        .await
        .unwrap();
    assert_eq!(
        transport.last().url.as_str(),
        format!("{BASE}enrich/feed/timeline/jo/?api_key=key&limit=1&withReactionCounts=true")
    );
    assert_eq!(page.results[0].actor.get("name"), Some(&json!("Jo")));

    feed.get_next_page_enriched_activities(&page).await.unwrap();
    assert_eq!(
        transport.last().url.as_str(),
        format!("{BASE}enrich/feed/timeline/jo/?api_key=key&limit=1&id_lt=x")
    );
}

#[tokio::test]
async fn test_notification_read_counters() {
    let transport = RecordingTransport::new();
    transport.respond(
        200,
        r#"{"unseen":3,"unread":1,"next":"","results":[{"id":"g","group":"g","verb":"like","activity_count":2,"actor_count":1,"is_seen":false,"is_read":false,"activities":[]}]}"#,
    );
    let feed = client(&transport).notification_feed("notification", "jo").unwrap();
    let page = feed.get_activities(&[]).await.unwrap();
    assert_eq!(page.unseen(), 3);
    assert_eq!(page.unread(), 1);
    assert_eq!(page.results[0].info.group.activity_count, 2);
}

#[test]
fn test_feed_constructor_validates_ids() {
    let transport = RecordingTransport::new();
    let c = client(&transport);
    assert!(matches!(c.flat_feed("user", "a b"), Err(Error::InvalidFeed(_))));
    assert!(matches!(c.notification_feed("", "1"), Err(Error::InvalidFeed(_))));
    assert_eq!(c.aggregated_feed("agg", "x_1-2").unwrap().id().to_string(), "agg:x_1-2");
}

// -- Writes -----------------------------------------------------------------

#[tokio::test]
async fn test_add_activity_posts_flat_body() {
    let transport = RecordingTransport::new();
    transport.respond(201, r#"{"id":"new","actor":"jo","verb":"pin","object":"place:1","mood":"ok","duration":"1ms"}"#);
    let feed = client(&transport).flat_feed("user", "jo").unwrap();
    let mut activity = Activity::new("jo", "pin", "place:1");
    activity.extra.insert("mood".into(), json!("ok"));

    let resp = feed.add_activity(&activity).await.unwrap();

    let req = transport.last();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.url.as_str(), format!("{BASE}feed/user/jo/?api_key=key"));
    assert_eq!(body_json(&req), json!({"actor": "jo", "verb": "pin", "object": "place:1", "mood": "ok"}));
    assert_eq!(resp.activity.id, "new");
    assert_eq!(resp.activity.extra["mood"], json!("ok"));
}

#[tokio::test]
async fn test_add_activities_wraps_list() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "jo").unwrap();
    feed.add_activities(&[Activity::new("a", "b", "c")]).await.unwrap();
    assert_eq!(
        body_json(&transport.last()),
        json!({"activities": [{"actor": "a", "verb": "b", "object": "c"}]})
    );
}

#[tokio::test]
async fn test_remove_activity_paths() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "jo").unwrap();
    feed.remove_activity_by_id("a1").await.unwrap();
    feed.remove_activity_by_foreign_id("post:9").await.unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].method, Method::DELETE);
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}feed/user/jo/a1/?api_key=key"));
    assert_eq!(reqs[1].url.as_str(), format!("{BASE}feed/user/jo/post:9/?api_key=key&foreign_id=1"));
}

#[tokio::test]
async fn test_remove_activity_id_cannot_add_query() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "1").unwrap();
    feed.remove_activity_by_id("x?foreign_id=1").await.unwrap();
    feed.remove_activity_by_foreign_id("post#1").await.unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}feed/user/1/x%3Fforeign_id=1/?api_key=key"));
    assert_eq!(reqs[0].url.query(), Some("api_key=key"));
    assert_eq!(
        reqs[1].url.as_str(),
        format!("{BASE}feed/user/1/post%231/?api_key=key&foreign_id=1")
    );
}

#[tokio::test]
async fn test_update_to_targets_requires_foreign_id_and_time() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "jo").unwrap();
    let err = feed
        .update_to_targets(&Activity::new("a", "b", "c"), &TargetsUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_update_to_targets_body() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("user", "jo").unwrap();
    let mut activity = Activity::new("a", "b", "c");
    activity.foreign_id = "post:1".into();
    activity.time = Some(Time::parse("2018-06-11T14:03:21.25").unwrap());
    let update = TargetsUpdate {
        add: vec![feed_id("timeline:1")],
        remove: vec![feed_id("timeline:2")],
        ..TargetsUpdate::default()
    };

    feed.update_to_targets(&activity, &update).await.unwrap();

    let req = transport.last();
    assert_eq!(
        req.url.as_str(),
        format!("{BASE}feed_targets/user/jo/activity_to_targets/?api_key=key")
    );
    assert_eq!(
        body_json(&req),
        json!({
            "foreign_id": "post:1",
            "time": "2018-06-11T14:03:21.25",
            "added_targets": ["timeline:1"],
            "removed_targets": ["timeline:2"]
        })
    );
}

// -- Follow graph -----------------------------------------------------------

#[tokio::test]
async fn test_follow_and_unfollow() {
    let transport = RecordingTransport::new();
    let feed = client(&transport).flat_feed("timeline", "jo").unwrap();
    let target = feed_id("user:ann");

    feed.follow(&target, Some(10)).await.unwrap();
    feed.unfollow(&target, false).await.unwrap();
    feed.unfollow(&target, true).await.unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}feed/timeline/jo/follows/?api_key=key"));
    assert_eq!(body_json(&reqs[0]), json!({"target": "user:ann", "activity_copy_limit": 10}));
    assert_eq!(reqs[1].method, Method::DELETE);
    assert_eq!(reqs[1].url.as_str(), format!("{BASE}feed/timeline/jo/follows/user:ann/?api_key=key"));
    assert_eq!(
        reqs[2].url.as_str(),
        format!("{BASE}feed/timeline/jo/follows/user:ann/?api_key=key&keep_history=1")
    );
}

#[tokio::test]
async fn test_follow_lists() {
    let transport = RecordingTransport::new();
    transport.respond(200, r#"{"results":[{"feed_id":"timeline:jo","target_id":"user:ann","created_at":"2018-01-01T00:00:00"}]}"#);
    let feed = client(&transport).flat_feed("user", "ann").unwrap();

    let following = feed
        .get_following(&[FollowListOption::Limit(1), FollowListOption::Filter(vec!["user:1".into()])])
        .await
        .unwrap();
    feed.get_followers(&[FollowListOption::Offset(5)]).await.unwrap();

    let reqs = transport.requests();
    assert_eq!(
        reqs[0].url.as_str(),
        format!("{BASE}feed/user/ann/follows/?api_key=key&limit=1&filter=user%3A1")
    );
    assert_eq!(reqs[1].url.as_str(), format!("{BASE}feed/user/ann/followers/?api_key=key&offset=5"));
    assert_eq!(following.results[0].target_id, "user:ann");
}

// -- App-level activity operations ------------------------------------------

#[tokio::test]
async fn test_get_activities_by_id_and_foreign_id() {
    let transport = RecordingTransport::new();
    let c = client(&transport);
    c.get_activities_by_id(&["a1", "a2"]).await.unwrap();
    let t = Time::parse("2018-06-11T14:03:21").unwrap();
    c.get_activities_by_foreign_id(&[ForeignIdTimePair::new("post:1", t)]).await.unwrap();
    c.get_enriched_activities_by_id(&["a1"], &[GetActivitiesOption::EnrichOwnReactions])
        .await
        .unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}activities/?api_key=key&ids=a1%2Ca2"));
    assert_eq!(
        reqs[1].url.as_str(),
        format!("{BASE}activities/?api_key=key&foreign_ids=post%3A1&timestamps=2018-06-11T14%3A03%3A21")
    );
    assert_eq!(
        reqs[2].url.as_str(),
        format!("{BASE}enrich/activities/?api_key=key&ids=a1&withOwnReactions=true")
    );
}

#[tokio::test]
async fn test_update_and_partial_update_bodies() {
    let transport = RecordingTransport::new();
    let c = client(&transport);
    let mut activity = Activity::new("a", "b", "c");
    activity.foreign_id = "f:1".into();
    c.update_activities(&[activity]).await.unwrap();

    let mut set = activity_feeds::Extra::new();
    set.insert("score".into(), json!(3));
    c.partial_update_activities(&[UpdateActivityRequest::by_id("a1", set, vec![])])
        .await
        .unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}activities/?api_key=key"));
    assert_eq!(
        body_json(&reqs[0]),
        json!({"activities": [{"actor": "a", "verb": "b", "object": "c", "foreign_id": "f:1"}]})
    );
    assert_eq!(reqs[1].url.as_str(), format!("{BASE}activity/?api_key=key"));
    assert_eq!(body_json(&reqs[1]), json!({"changes": [{"id": "a1", "set": {"score": 3}}]}));
}

#[tokio::test]
async fn test_batch_follow_operations() {
    let transport = RecordingTransport::new();
    let c = client(&transport);
    let (src, dst) = (feed_id("timeline:1"), feed_id("user:2"));

    c.add_to_many(Activity::new("a", "b", "c"), &[src.clone(), dst.clone()]).await.unwrap();
    c.follow_many(&[FollowRelationship::new(&src, &dst)], Some(0)).await.unwrap();
    c.unfollow_many(&[UnfollowRelationship::new(&src, &dst, true)]).await.unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs[0].url.as_str(), format!("{BASE}feed/add_to_many/?api_key=key"));
    assert_eq!(
        body_json(&reqs[0]),
        json!({"activity": {"actor": "a", "verb": "b", "object": "c"}, "feeds": ["timeline:1", "user:2"]})
    );
    assert_eq!(reqs[1].url.as_str(), format!("{BASE}follow_many/?api_key=key&activity_copy_limit=0"));
    assert_eq!(body_json(&reqs[1]), json!([{"source": "timeline:1", "target": "user:2"}]));
    assert_eq!(reqs[2].url.as_str(), format!("{BASE}unfollow_many/?api_key=key"));
    assert_eq!(
        body_json(&reqs[2]),
        json!([{"source": "timeline:1", "target": "user:2", "keep_history": true}])
    );
}

// -- Headers and errors -----------------------------------------------------

#[tokio::test]
async fn test_auth_token_headers() {
    let transport = RecordingTransport::new();
    let config = ClientConfig::new("key").with_auth_token("signed.jwt.token");
    let c = Client::with_transport(config, transport.clone()).unwrap();
    c.get_activities_by_id(&["a"]).await.unwrap();

    let req = transport.last();
    assert_eq!(req.header("authorization"), Some("signed.jwt.token"));
    assert_eq!(req.header("stream-auth-type"), Some("jwt"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert!(req.header("x-stream-client").unwrap().starts_with("activity-feeds-rust-"));
}

#[tokio::test]
async fn test_no_auth_headers_without_token() {
    let transport = RecordingTransport::new();
    client(&transport).get_activities_by_id(&["a"]).await.unwrap();
    assert_eq!(transport.last().header("authorization"), None);
}

#[tokio::test]
async fn test_api_error_decoded() {
    let transport = RecordingTransport::new();
    transport.respond(
        403,
        r#"{"code":17,"detail":"you may not read this feed","duration":"0.1ms","exception":"NotAllowedException","status_code":403}"#,
    );
    let feed = client(&transport).flat_feed("secret", "x").unwrap();
    match feed.get_activities(&[]).await {
        Err(Error::Api(ApiError { code, exception, status_code, .. })) => {
            assert_eq!(code, 17);
            assert_eq!(exception, "NotAllowedException");
            assert_eq!(status_code, 403);
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let transport = RecordingTransport::new();
    transport.respond(200, "not json");
    let feed = client(&transport).flat_feed("user", "1").unwrap();
    assert!(matches!(feed.get_activities(&[]).await, Err(Error::Decode(_))));
}

#[test]
fn test_client_is_cheap_to_share() {
    let transport = RecordingTransport::new();
    let c = client(&transport);
    let shared = Arc::new(c.clone());
    assert_eq!(shared.config().api_key, c.config().api_key);
}
