use super::*;

#[test]
fn empty_input_notice_is_destructive() {
    let notice = Notice::EmptyInput;
    assert_eq!(notice.kind(), "empty_input");
    assert_eq!(notice.title(), "请输入文字");
    assert_eq!(notice.description(), "请先输入您想要转换为漫画的文字内容");
    assert_eq!(notice.variant(), NoticeVariant::Destructive);
}

#[test]
fn completed_notice_texts() {
    let notice = Notice::Completed;
    assert_eq!(notice.title(), "生成完成！");
    assert_eq!(notice.description(), "您的四格漫画已成功生成");
    assert_eq!(notice.variant(), NoticeVariant::Default);
}

#[test]
fn generation_failed_names_panel() {
    let notice = Notice::GenerationFailed { panel: PanelId::try_from(3_u8).unwrap() };
    assert_eq!(notice.kind(), "generation_failed");
    assert_eq!(notice.description(), "第3格生成失败，请稍后重试");
    assert_eq!(notice.variant(), NoticeVariant::Destructive);
}

#[test]
fn stub_action_notices() {
    assert_eq!(Notice::DownloadStarted.title(), "开始下载");
    assert_eq!(Notice::ShareComingSoon.description(), "分享功能即将推出！");
}

#[test]
fn variant_serializes_lowercase() {
    assert_eq!(serde_json::to_value(NoticeVariant::Destructive).unwrap(), serde_json::json!("destructive"));
}

#[tokio::test]
async fn channel_sink_delivers_in_order() {
    let (tx, mut rx) = mpsc::channel(4);
    tx.notify(Notice::EmptyInput);
    tx.notify(Notice::Completed);

    assert_eq!(rx.recv().await, Some(Notice::EmptyInput));
    assert_eq!(rx.recv().await, Some(Notice::Completed));
}

#[test]
fn channel_sink_drops_when_full() {
    let (tx, mut rx) = mpsc::channel(1);
    tx.notify(Notice::DownloadStarted);
    tx.notify(Notice::ShareComingSoon);

    assert_eq!(rx.try_recv().ok(), Some(Notice::DownloadStarted));
    assert!(rx.try_recv().is_err());
}
