use std::sync::Arc;

use image::{Rgba, RgbaImage};
use pdf_pager_runtime::{Bitmap, Effect, Page, State, Update, reduce};

fn bitmap(shade: u8) -> Bitmap {
    Arc::new(RgbaImage::from_pixel(4, 6, Rgba([shade, shade, shade, 255])))
}

fn five_unloaded() -> State {
    let mut state = State::default();
    let fold = reduce(
        &mut state,
        Update::Pages {
            generation: 1,
            pages: Page::unloaded(5),
        },
    );
    assert!(fold.changed);
    state
}

#[test]
fn test_page_update_touches_only_its_index() {
    let mut state = five_unloaded();
    let before = state.clone();
    let b = bitmap(10);

    let fold = reduce(
        &mut state,
        Update::Page {
            generation: 1,
            page: Page::loaded(2, b.clone()),
        },
    );

    assert!(fold.changed);
    assert_eq!(fold.effect, None);
    for i in [0, 1, 3, 4] {
        assert_eq!(state.page(i), before.page(i));
    }
    let page = state.page(2).unwrap();
    assert!(Arc::ptr_eq(page.bitmap.as_ref().unwrap(), &b));
    assert!(!page.is_loading);
}

#[test]
fn test_snapshots_share_bitmaps() {
    let mut state = five_unloaded();
    let first = bitmap(1);
    reduce(
        &mut state,
        Update::Page {
            generation: 1,
            page: Page::loaded(0, first.clone()),
        },
    );
    let snapshot = state.clone();

    reduce(
        &mut state,
        Update::Page {
            generation: 1,
            page: Page::loaded(4, bitmap(2)),
        },
    );

    let kept = state.page(0).unwrap().bitmap.as_ref().unwrap();
    assert!(Arc::ptr_eq(kept, &first));
    assert!(Arc::ptr_eq(
        snapshot.page(0).unwrap().bitmap.as_ref().unwrap(),
        &first
    ));
    assert!(!snapshot.page(4).unwrap().is_loaded());
}

#[test]
fn test_page_list_replaced_wholesale() {
    let mut state = five_unloaded();
    reduce(
        &mut state,
        Update::Page {
            generation: 1,
            page: Page::loaded(1, bitmap(3)),
        },
    );

    reduce(
        &mut state,
        Update::Pages {
            generation: 2,
            pages: Page::unloaded(3),
        },
    );

    assert_eq!(state.generation(), 2);
    assert_eq!(state.pages(), Page::unloaded(3).as_slice());
}

#[test]
fn test_stale_page_and_error_are_ignored() {
    let mut state = five_unloaded();
    reduce(
        &mut state,
        Update::Pages {
            generation: 2,
            pages: Page::unloaded(5),
        },
    );
    let before = state.clone();

    let page = reduce(
        &mut state,
        Update::Page {
            generation: 1,
            page: Page::loaded(0, bitmap(9)),
        },
    );
    let error = reduce(
        &mut state,
        Update::Error {
            generation: Some(1),
            message: "late failure".to_string(),
        },
    );

    assert!(!page.changed);
    assert_eq!(error.effect, None);
    assert_eq!(state, before);
}

#[test]
fn test_show_file_system_is_state_independent() {
    let mime_types = vec!["application/pdf".to_string()];
    for mut state in [State::default(), five_unloaded()] {
        let before = state.clone();
        let fold = reduce(
            &mut state,
            Update::ShowFileSystem {
                mime_types: mime_types.clone(),
            },
        );
        assert!(!fold.changed);
        assert_eq!(
            fold.effect,
            Some(Effect::ShowFileSystem {
                mime_types: mime_types.clone()
            })
        );
        assert_eq!(state, before);
    }
}
