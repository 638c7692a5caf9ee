//! Integration tests for `ExemplarRetriever` using wiremock HTTP mocks.

use std::sync::Arc;

use tonepost_core::{RankerWeights, StyleRules, Tone};
use tonepost_llm::EmbeddingClient;
use tonepost_retrieval::{ExemplarRetriever, QdrantClient};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/collections/exemplar_captions/points/search";

fn retriever(server: &MockServer) -> ExemplarRetriever {
    ExemplarRetriever::new(
        EmbeddingClient::new(&server.uri(), 10).expect("embedding client"),
        QdrantClient::new(&server.uri(), "exemplar_captions"),
        Arc::new(StyleRules::builtin()),
        RankerWeights::default(),
    )
}

fn point(caption: &str, tone: &str, popularity: u32, score: f32) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "score": score,
        "payload": {
            "caption": caption,
            "category": "카페",
            "tone": tone,
            "popularity": popularity,
            "source_id": format!("post-{popularity}")
        }
    })
}

async fn mount_embed(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([[0.1, 0.2, 0.3]])),
        )
        .mount(server)
        .await;
}

const USABLE_CASUAL: [&str; 5] = [
    "오늘 새로 내린 원두가 향이 좋아서 오픈하자마자 몇 잔이나 나갔어요 ㅎㅎ 날씨도 선선해서 테라스 자리부터 채워졌어요",
    "비 오는 날이라 그런지 라떼가 진짜 많이 나갔어요 창가 자리에서 천천히 책을 읽다 가시는 분들이 많았어요",
    "새로 구운 스콘이 점심시간 전에 다 나갔어요 ㅎㅎ 내일은 조금 더 넉넉하게 반죽을 준비해 보려고 해요",
    "요즘 날씨가 좋아서 테라스 자리 찾는 분들이 많았어요 진짜 오랜만에 정신없이 바쁜 하루를 보냈어요",
    "단골 손님이 친구들을 데리고 왔어요 ㅎㅎ 다 같이 신메뉴를 주문해 주셔서 기분 좋게 하루를 마감했어요",
];

#[tokio::test]
async fn returns_top_four_when_tone_query_is_rich() {
    let server = MockServer::start().await;
    mount_embed(&server).await;

    let points: Vec<serde_json::Value> = USABLE_CASUAL
        .iter()
        .enumerate()
        .map(|(i, caption)| point(caption, "CASUAL", 10 * (i as u32 + 1), 0.9 - 0.05 * i as f32))
        .collect();

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": points })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let exemplars = retriever(&server)
        .retrieve("신메뉴 딸기라떼 출시 비", "카페", Tone::Casual)
        .await;

    assert_eq!(exemplars.len(), 4, "top-4 cap");
    assert_eq!(exemplars[0].text, USABLE_CASUAL[0], "highest similarity first");
}

#[tokio::test]
async fn falls_back_to_broader_query_when_tone_pool_is_thin() {
    let server = MockServer::start().await;
    mount_embed(&server).await;

    // Tone-filtered query: one usable row plus one rejected short row.
    let primary = serde_json::json!({
        "result": [
            point(USABLE_CASUAL[0], "CASUAL", 50, 0.95),
            point("너무 짧은 캡션", "CASUAL", 10, 0.9),
        ]
    });
    // Broader query repeats the primary row (dedup) and adds three usable rows.
    let broader = serde_json::json!({
        "result": [
            point(USABLE_CASUAL[0], "CASUAL", 50, 0.95),
            point(USABLE_CASUAL[1], "CASUAL", 40, 0.85),
            point(USABLE_CASUAL[2], "CASUAL", 30, 0.80),
            point(USABLE_CASUAL[3], "CASUAL", 20, 0.75),
        ]
    });

    // The tone-filtered request carries a "tone" condition in its filter;
    // mount its mock first so it wins over the catch-all broader mock.
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(body_string_contains("\"tone\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(&primary))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&broader))
        .expect(1)
        .mount(&server)
        .await;

    let exemplars = retriever(&server)
        .retrieve("신메뉴 딸기라떼 출시", "카페", Tone::Casual)
        .await;

    assert_eq!(exemplars.len(), 4, "merged pool should yield four exemplars");
    let texts: Vec<&str> = exemplars.iter().map(|e| e.text.as_str()).collect();
    assert!(texts.contains(&USABLE_CASUAL[0]));
    assert!(texts.contains(&USABLE_CASUAL[3]));
}

#[tokio::test]
async fn embedding_failure_degrades_to_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let exemplars = retriever(&server)
        .retrieve("신메뉴 딸기라떼 출시", "카페", Tone::Casual)
        .await;

    assert!(exemplars.is_empty(), "store trouble must never raise");
}

#[tokio::test]
async fn vector_store_failure_degrades_to_empty_list() {
    let server = MockServer::start().await;
    mount_embed(&server).await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let exemplars = retriever(&server)
        .retrieve("신메뉴 딸기라떼 출시", "카페", Tone::Casual)
        .await;

    assert!(exemplars.is_empty());
}

#[tokio::test]
async fn unusable_rows_without_fallback_material_yield_empty_list() {
    let server = MockServer::start().await;
    mount_embed(&server).await;

    // Both queries return only promotional rows, which the filter rejects.
    let body = serde_json::json!({
        "result": [
            point(
                "지금 할인 이벤트 중이에요 서둘러 주세요 모든 메뉴를 저렴하게 즐길 수 있는 기회를 놓치지 마세요 오늘만 진행해요",
                "CASUAL",
                900,
                0.99
            ),
        ]
    });

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(2)
        .mount(&server)
        .await;

    let exemplars = retriever(&server)
        .retrieve("신메뉴 딸기라떼 출시", "카페", Tone::Casual)
        .await;

    assert!(exemplars.is_empty());
}
