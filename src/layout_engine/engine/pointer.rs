use super::{EventResponse, LayoutEngine};
use crate::layout_engine::WorkspaceId;
use crate::layout_engine::interactive::CursorShape;
use crate::sys::event::{Modifiers, PointerEvent, PointerEventKind};

impl LayoutEngine {
    /// Routes one pointer event to the resize or move controller of `ws`.
    pub fn handle_pointer(&mut self, ws: WorkspaceId, event: &PointerEvent) -> EventResponse {
        let Some(state) = self.workspaces.get(ws) else {
            return EventResponse::default();
        };
        let resizing = state.resize.is_some();
        let drag_hover = state.drag.as_ref().map(|d| d.hover);
        let (screen, gaps) = (state.last_screen, state.last_gaps);
        let location = event.location;

        match event.kind {
            PointerEventKind::Move => {
                if resizing || drag_hover.is_some() {
                    return EventResponse::default();
                }
                let cursor = self
                    .tree
                    .hit_test_resize(location, ws)
                    .map_or(CursorShape::Default, |hit| hit.edges.cursor());
                EventResponse { cursor: Some(cursor), ..Default::default() }
            }
            PointerEventKind::Down => self.pointer_down(ws, event),
            PointerEventKind::Drag => {
                if resizing {
                    let changed = self.interactive_resize_update(ws, location, screen, &gaps);
                    EventResponse { needs_layout: changed, ..Default::default() }
                } else if let Some(previous) = drag_hover {
                    let hover = self.interactive_move_update(ws, location);
                    EventResponse { needs_layout: hover != previous, ..Default::default() }
                } else {
                    EventResponse::default()
                }
            }
            PointerEventKind::Up => {
                if resizing {
                    self.interactive_resize_end(ws);
                    EventResponse {
                        cursor: Some(CursorShape::Default),
                        needs_layout: true,
                        ..Default::default()
                    }
                } else if drag_hover.is_some() {
                    let changed = self.interactive_move_end(ws, location);
                    EventResponse {
                        focus_window: if changed { self.selected_window(ws) } else { None },
                        needs_layout: true,
                        ..Default::default()
                    }
                } else {
                    EventResponse::default()
                }
            }
        }
    }

    fn pointer_down(&mut self, ws: WorkspaceId, event: &PointerEvent) -> EventResponse {
        let interactive = self.settings.interactive;
        let held = |required: Modifiers| {
            !required.is_empty() && event.modifiers.contains(required)
        };

        if held(interactive.move_modifier) {
            let Some(node) = self.tree.hit_test_tiled(event.location, ws) else {
                return EventResponse::default();
            };
            let Some(window) = self.tree.window(node).map(|w| w.window()) else {
                return EventResponse::default();
            };
            let insert = held(interactive.insert_modifier);
            if !self.interactive_move_begin(ws, node, window, event.location, insert) {
                return EventResponse::default();
            }
            self.set_selection(ws, node);
            return EventResponse::focus(Some(window));
        }

        if let Some(hit) = self.tree.hit_test_resize(event.location, ws)
            && self.interactive_resize_begin(ws, hit.node, hit.edges, event.location)
        {
            return EventResponse { cursor: Some(hit.edges.cursor()), ..Default::default() };
        }
        EventResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{laid_out, wid};
    use super::*;
    use crate::sys::geometry::Point;

    fn event(kind: PointerEventKind, x: f64, y: f64, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::new(kind, Point::new(x, y), modifiers)
    }

    fn ratio(engine: &LayoutEngine, idx: usize, ws: WorkspaceId) -> f64 {
        let column = engine.tree().columns(ws)[idx];
        engine.tree().column(column).unwrap().width_ratio()
    }

    #[test_log::test]
    fn hovering_reports_the_edge_cursor() {
        let (mut engine, ws, _) = laid_out(2);
        let response = engine.handle_pointer(ws, &event(PointerEventKind::Move, 500.0, 400.0, Modifiers::empty()));
        assert_eq!(response.cursor, Some(CursorShape::ResizeLeftRight));

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Move, 250.0, 400.0, Modifiers::empty()));
        assert_eq!(response.cursor, Some(CursorShape::Default));

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Move, 250.0, 795.0, Modifiers::empty()));
        assert_eq!(response.cursor, Some(CursorShape::ResizeUpDown));
    }

    #[test_log::test]
    fn press_drag_release_on_an_edge_resizes() {
        let (mut engine, ws, _) = laid_out(2);
        let response = engine.handle_pointer(ws, &event(PointerEventKind::Down, 500.0, 400.0, Modifiers::empty()));
        assert_eq!(response.cursor, Some(CursorShape::ResizeLeftRight));
        assert!(engine.workspace(ws).unwrap().resize_session().is_some());

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Drag, 600.0, 400.0, Modifiers::empty()));
        assert!(response.needs_layout);
        assert_eq!(ratio(&engine, 0, ws), 0.6);

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Move, 900.0, 400.0, Modifiers::empty()));
        assert_eq!(response, EventResponse::default());

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Up, 600.0, 400.0, Modifiers::empty()));
        assert_eq!(response.cursor, Some(CursorShape::Default));
        assert!(engine.workspace(ws).unwrap().resize_session().is_none());
    }

    #[test_log::test]
    fn modifier_press_drags_the_window() {
        let (mut engine, ws, nodes) = laid_out(2);
        let response = engine.handle_pointer(ws, &event(PointerEventKind::Down, 250.0, 400.0, Modifiers::ALT));
        assert_eq!(response.focus_window, Some(wid(1)));
        assert_eq!(engine.selected_node(ws), Some(nodes[0]));
        assert!(!engine.workspace(ws).unwrap().move_session().unwrap().is_insert_mode);

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Drag, 700.0, 400.0, Modifiers::ALT));
        assert!(response.needs_layout);
        let response = engine.handle_pointer(ws, &event(PointerEventKind::Drag, 710.0, 400.0, Modifiers::ALT));
        assert!(!response.needs_layout);

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Up, 710.0, 400.0, Modifiers::ALT));
        assert_eq!(response.focus_window, Some(wid(1)));
        assert_eq!(engine.tree().window_rows(ws), vec![vec![nodes[1]], vec![nodes[0]]]);
    }

    #[test_log::test]
    fn insert_modifier_selects_insert_mode() {
        let (mut engine, ws, _) = laid_out(2);
        let modifiers = Modifiers::ALT | Modifiers::SHIFT;
        let _ = engine.handle_pointer(ws, &event(PointerEventKind::Down, 250.0, 400.0, modifiers));
        assert!(engine.workspace(ws).unwrap().move_session().unwrap().is_insert_mode);
    }

    #[test_log::test]
    fn plain_press_inside_a_tile_does_nothing() {
        let (mut engine, ws, _) = laid_out(2);
        let response = engine.handle_pointer(ws, &event(PointerEventKind::Down, 250.0, 400.0, Modifiers::empty()));
        assert_eq!(response, EventResponse::default());
        let state = engine.workspace(ws).unwrap();
        assert!(state.resize_session().is_none() && state.move_session().is_none());

        let response = engine.handle_pointer(ws, &event(PointerEventKind::Up, 250.0, 400.0, Modifiers::empty()));
        assert_eq!(response, EventResponse::default());
    }
}
