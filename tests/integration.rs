//! Integration tests for the eoka-backed session and the page facades.
//!
//! These tests require Chrome to be installed and available.
//! Run with: cargo test --test integration -- --ignored

use std::time::Duration;
use storefront_e2e::pages::{CartPage, PageContext, PollPolicy};
use storefront_e2e::{
    EokaSession, Error, Expectation, FrameLocator, Locator, NameMatch, Session, StepRecorder,
    FRAME_ACCESS_ARGS,
};

/// Check if Chrome is available
fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

async fn open(html: &str) -> (eoka::Browser, EokaSession) {
    let browser = eoka::Browser::launch()
        .await
        .expect("Failed to launch browser");
    open_in(browser, html).await
}

async fn open_in(browser: eoka::Browser, html: &str) -> (eoka::Browser, EokaSession) {
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    let session = EokaSession::new(page, Duration::from_secs(2));
    session
        .goto(&format!("data:text/html,{}", html))
        .await
        .expect("Failed to navigate");
    (browser, session)
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_resolves_each_strategy() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(
        r#"
        <span data-testid="productPage_span_productLabel">Pyjama long</span>
        <button aria-label="close button">x</button>
        <ul><li class="size">4 ans</li><li class="size">6 ans</li></ul>
        <input type="radio" value="HOME">
    "#,
    )
    .await;

    let label = Locator::test_id("productPage_span_productLabel");
    assert_eq!(session.count(&label).await.unwrap(), 1);
    assert_eq!(
        session.text_content(&label).await.unwrap().as_deref(),
        Some("Pyjama long")
    );

    let close = Locator::role_named("button", NameMatch::Exact("close button".into()));
    assert_eq!(session.count(&close).await.unwrap(), 1);

    let sizes = Locator::css("ul").locator("li.size");
    assert_eq!(session.count(&sizes).await.unwrap(), 2);
    assert_eq!(
        session.text_content(&sizes.clone().nth(-1)).await.unwrap().as_deref(),
        Some("6 ans")
    );

    let xpath = Locator::xpath(r#"//input[@type="radio"][@value="HOME"]"#);
    assert!(session.state(&xpath).await.unwrap().visible);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_click_and_fill() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(
        r#"
        <input data-testid="postalCode_input_postalCode">
        <button data-testid="postalCode_button_validate"
            onclick="document.getElementById('out').textContent = 'ok'">OK</button>
        <div id="out"></div>
    "#,
    )
    .await;

    let input = Locator::test_id("postalCode_input_postalCode");
    session.fill(&input, "59000").await.unwrap();
    assert_eq!(session.input_value(&input).await.unwrap(), "59000");

    session
        .click(&Locator::test_id("postalCode_button_validate"))
        .await
        .unwrap();
    Expectation::new(&session, Locator::css("div[id=out]"))
        .to_have_text("ok")
        .await
        .unwrap();

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_frame_scoped_input_ignores_outer_element() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(
        r#"
        <input type="tel" id="outer" value="outside">
        <iframe id="cardNumber-frame" srcdoc="<input type='tel' value=''>"></iframe>
    "#,
    )
    .await;
    session.pause(Duration::from_millis(300)).await;

    let frame = FrameLocator::new(r#"iframe[id*="cardNumber"]"#);
    let inside = frame.locator(r#"input[type="tel"]"#);
    let outside = Locator::css(r#"input[type="tel"]"#);

    session.fill(&inside, "4111111111111111").await.unwrap();
    assert_eq!(
        session.input_value(&inside).await.unwrap(),
        "4111111111111111"
    );
    assert_eq!(session.input_value(&outside).await.unwrap(), "outside");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_cross_origin_frame_is_reachable() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let config = eoka::StealthConfig {
        extra_args: FRAME_ACCESS_ARGS.iter().map(|a| a.to_string()).collect(),
        ..Default::default()
    };
    let browser = eoka::Browser::launch_with_config(config)
        .await
        .expect("Failed to launch browser");
    // A data: URL frame has an opaque origin, unlike srcdoc.
    let (browser, session) = open_in(
        browser,
        r#"<iframe id="cvv-frame" src="data:text/html,<input type='tel' value=''>"></iframe>"#,
    )
    .await;
    session.pause(Duration::from_millis(500)).await;

    let cvv = FrameLocator::new(r#"iframe[id*="cvv"]"#).locator(r#"input[type="tel"]"#);
    session.fill(&cvv, "123").await.unwrap();
    assert_eq!(session.input_value(&cvv).await.unwrap(), "123");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_missing_frame_is_distinct_error() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(r#"<input type="tel">"#).await;

    let cvv = FrameLocator::new(r#"iframe[id*="cvv"]"#).locator(r#"input[type="tel"]"#);
    let err = session.fill(&cvv, "123").await.unwrap_err();
    assert!(matches!(err, Error::FrameNotFound(_)), "{err}");

    let missing = Locator::test_id("absent");
    let err = session.click(&missing).await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)), "{err}");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_ambiguous_locator_is_not_actionable() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(r#"<button>A</button><button>B</button>"#).await;

    let err = session.click(&Locator::role("button")).await.unwrap_err();
    assert!(matches!(err, Error::NotActionable(_)), "{err}");
    session.click(&Locator::role("button").first()).await.unwrap();

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_ensure_checked_is_idempotent() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(
        r#"<input type="checkbox" data-testid="homeAddressFormFR_button_billingDifferentThanShipping">"#,
    )
    .await;

    let steps = StepRecorder::new();
    let ctx = PageContext::new(&session, &steps);
    let same = Locator::test_id("homeAddressFormFR_button_billingDifferentThanShipping");

    ctx.ensure_checked(&same).await.unwrap();
    ctx.ensure_checked(&same).await.unwrap();
    assert!(session.state(&same).await.unwrap().checked);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_cart_amount_polling() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let (browser, session) = open(
        r#"
        <span data-testid="cartInvoiceDetails_div_total_price">40,00</span>
        <button data-testid="button_moreQuantity" onclick="
            const total = document.querySelector('[data-testid=cartInvoiceDetails_div_total_price]');
            setTimeout(() => { total.textContent = (parseInt(total.textContent) + 35) + ',00'; }, 50);
        ">+</button>
    "#,
    )
    .await;

    let steps = StepRecorder::new();
    let cart = CartPage::new(PageContext::new(&session, &steps));
    let amount = cart
        .ensure_cart_amount_above(100, &PollPolicy::new(Duration::from_millis(300), 5))
        .await
        .unwrap();

    assert_eq!(amount, 110);
    assert_eq!(steps.into_report()[0].children.len(), 2);

    let png = session.screenshot().await.unwrap();
    assert!(!png.is_empty());

    browser.close().await.expect("Failed to close browser");
}
