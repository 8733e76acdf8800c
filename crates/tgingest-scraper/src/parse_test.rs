use super::*;

const LISTING: &str = r#"
<html><body>
  <div class="tgme_header_info">
    <div class="tgme_header_title"> Lobelia pharmacy and cosmetics </div>
  </div>
  <section class="tgme_channel_history">
    <div class="tgme_widget_message_wrap">
      <div class="tgme_widget_message text_not_supported_wrap js-widget_message" data-post="lobelia4cosmetics/14810"></div>
    </div>
    <div class="tgme_widget_message_wrap">
      <div class="tgme_widget_message js-widget_message" data-post="lobelia4cosmetics/14812"></div>
    </div>
    <div class="tgme_widget_message_wrap">
      <div class="tgme_widget_message js-widget_message" data-post="lobelia4cosmetics/14811"></div>
    </div>
    <div class="tgme_widget_message js-widget_message"></div>
  </section>
</body></html>
"#;

fn post_page(data_post: &str, inner: &str) -> String {
    format!(
        r#"<html><body><section>
        <div class="tgme_widget_message js-widget_message" data-post="DoctorsET/99">
          <div class="tgme_widget_message_text">neighbour</div>
        </div>
        <div class="tgme_widget_message js-widget_message" data-post="{data_post}">{inner}</div>
        </section></body></html>"#
    )
}

// -----------------------------------------------------------------------
// listing
// -----------------------------------------------------------------------

#[test]
fn listing_collects_post_ids_and_channel_name() {
    let listing = parse_listing(LISTING);
    assert_eq!(
        listing.channel_name.as_deref(),
        Some("Lobelia pharmacy and cosmetics")
    );
    assert_eq!(
        listing.post_ids,
        vec![
            "lobelia4cosmetics/14810",
            "lobelia4cosmetics/14812",
            "lobelia4cosmetics/14811"
        ]
    );
}

#[test]
fn listing_without_header_has_no_channel_name() {
    let listing = parse_listing(
        r#"<div class="tgme_widget_message" data-post="EAHCI/3"></div>"#,
    );
    assert!(listing.channel_name.is_none());
    assert_eq!(listing.post_ids, vec!["EAHCI/3"]);
}

#[test]
fn empty_page_has_no_post_ids() {
    let listing = parse_listing("<html><body><p>nothing here</p></body></html>");
    assert!(listing.post_ids.is_empty());
}

#[test]
fn sequence_is_numeric_suffix() {
    assert_eq!(sequence_of("lobelia4cosmetics/14812"), Some(14812));
    assert_eq!(sequence_of("EAHCI/1"), Some(1));
    assert_eq!(sequence_of("EAHCI/abc"), None);
    assert_eq!(sequence_of("EAHCI"), None);
}

// -----------------------------------------------------------------------
// single post
// -----------------------------------------------------------------------

#[test]
fn post_fields_are_extracted_from_matching_container() {
    let html = post_page(
        "DoctorsET/100",
        r#"
        <div class="tgme_widget_message_text js-message_text">Stay <b>hydrated</b><br/>Drink water <i class="emoji" style="background-image:url('//telegram.org/img/emoji/40/F09F92A7.png')"><b>💧</b></i>daily</div>
        <div class="tgme_widget_message_footer">
          <span class="tgme_widget_message_views">2.0K</span>
          <span class="tgme_widget_message_meta">
            <span class="tgme_widget_message_from_author">Dr. Abebe</span>
            <a class="tgme_widget_message_date" href="https://t.me/DoctorsET/100">
              <time datetime="2023-05-14T09:02:11+00:00" class="time">09:02</time>
            </a>
          </span>
        </div>"#,
    );

    let post = parse_post(&html, "DoctorsET/100").expect("matching container");
    assert_eq!(post.message_text, "Stay hydrated\nDrink water daily");
    assert_eq!(post.views.as_deref(), Some("2.0K"));
    assert_eq!(post.author.as_deref(), Some("Dr. Abebe"));
    assert_eq!(post.timestamp.as_deref(), Some("2023-05-14T09:02:11+00:00"));
    assert!(post.photos.is_empty());
}

#[test]
fn missing_container_is_none() {
    let html = post_page("DoctorsET/100", "");
    assert!(parse_post(&html, "DoctorsET/101").is_none());
}

#[test]
fn container_match_is_exact() {
    let html = post_page("DoctorsET/100", "");
    assert!(parse_post(&html, "DoctorsET/10").is_none());
    assert!(parse_post(&html, "doctorset/100").is_none());
}

#[test]
fn absent_sub_elements_are_independently_missing() {
    let html = post_page(
        "DoctorsET/5",
        r#"<span class="tgme_widget_message_meta"><time datetime="2023-01-01T00:00:00+00:00"></time></span>"#,
    );
    let post = parse_post(&html, "DoctorsET/5").unwrap();
    assert_eq!(post.message_text, "");
    assert!(post.views.is_none());
    assert!(post.author.is_none());
    assert_eq!(post.timestamp.as_deref(), Some("2023-01-01T00:00:00+00:00"));
}

#[test]
fn photos_keep_document_order_and_wrapper_index() {
    let html = post_page(
        "EAHCI/3",
        r#"
        <a class="tgme_widget_message_photo_wrap" style="width:100%;background-image:url('https://cdn4.telesco.pe/file/a.jpg')"></a>
        <a class="tgme_widget_message_photo_wrap" style="width:100%"></a>
        <a class="tgme_widget_message_photo_wrap" style="background-image: url(&quot;https://cdn4.telesco.pe/file/c.jpg&quot;)"></a>
        <div class="tgme_widget_message_text">Three photos</div>"#,
    );

    let post = parse_post(&html, "EAHCI/3").unwrap();
    assert_eq!(
        post.photos,
        vec![
            PhotoRef {
                index: 0,
                url: "https://cdn4.telesco.pe/file/a.jpg".to_string()
            },
            PhotoRef {
                index: 2,
                url: "https://cdn4.telesco.pe/file/c.jpg".to_string()
            },
        ]
    );
}

#[test]
fn neighbour_photos_are_not_attributed() {
    let html = r#"<html><body>
        <div class="tgme_widget_message" data-post="EAHCI/2">
          <a class="tgme_widget_message_photo_wrap" style="background-image:url('https://cdn/other.jpg')"></a>
          <div class="tgme_widget_message_text">theirs</div>
        </div>
        <div class="tgme_widget_message" data-post="EAHCI/3">
          <div class="tgme_widget_message_text">mine</div>
        </div>
        </body></html>"#;
    let post = parse_post(html, "EAHCI/3").unwrap();
    assert!(post.photos.is_empty());
    assert_eq!(post.message_text, "mine");
}

#[test]
fn background_image_url_accepts_quote_styles() {
    assert_eq!(
        background_image_url("background-image:url('https://a/1.jpg')").as_deref(),
        Some("https://a/1.jpg")
    );
    assert_eq!(
        background_image_url("background-image:url(\"https://a/2.jpg\")").as_deref(),
        Some("https://a/2.jpg")
    );
    assert_eq!(
        background_image_url("background-image:url(https://a/3.jpg)").as_deref(),
        Some("https://a/3.jpg")
    );
    assert_eq!(background_image_url("width:10px"), None);
}
