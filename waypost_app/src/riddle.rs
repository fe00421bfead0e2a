// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A riddle screen: password form, then video and clue panel, then (on the
//! designated step) the "did you read it?" prompt.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use core::cell::{Cell, RefCell};

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use web_sys::{
    Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlVideoElement,
};

use waypost_backend_web::dom::{self, Listener};
use waypost_backend_web::{Interval, Timeout, now, screen};
use waypost_core::password::{ERROR_DISPLAY, PasswordGate, SubmitOutcome};
use waypost_core::riddle::RiddleEntry;
use waypost_core::route::Route;
use waypost_core::subscription::{OnCancel, SubscriptionId, SubscriptionKind, Subscriptions};
use waypost_core::time::{Duration, Timestamp};
use waypost_core::trace::{HostOp, PasswordAttemptEvent, UnlockEvent};
use waypost_core::viewer::{
    ConfirmPrompt, MEDIA_ERROR_MESSAGE, MediaViewer, OrientationRequest, PlaybackEffect,
    PromptEvent, PromptPhase, UnlockReason,
};

use crate::shell::Shell;
use crate::ui;

/// How often the confirmation prompt refreshes its countdown.
const PROMPT_POLL: Duration = Duration::from_millis(250);

struct RiddleUi {
    form: HtmlFormElement,
    input: HtmlInputElement,
    submit: HtmlButtonElement,
    error: HtmlElement,
    media: HtmlElement,
    video: HtmlVideoElement,
    restart: HtmlButtonElement,
    fullscreen: HtmlButtonElement,
    failure: HtmlElement,
    unlock_now: HtmlButtonElement,
    locked_note: HtmlElement,
    clue_panel: HtmlElement,
    prompt: HtmlElement,
    prompt_seconds: HtmlElement,
    confirm: HtmlButtonElement,
    back: HtmlButtonElement,
}

impl RiddleUi {
    fn build(shell: &Shell, entry: &RiddleEntry, next: Option<&RiddleEntry>) -> Result<Self, JsValue> {
        let doc = &shell.doc;
        let card = ui::card(doc, &shell.root)?;
        card.append_child(&dom::text_element(
            doc,
            "h1",
            ui::TITLE,
            &format!("Enigma {}", entry.path),
        )?.into())?;

        // Password form.
        let form: HtmlFormElement = doc.create_element("form")?.unchecked_into();
        dom::style(&form, "display: flex; gap: 8px; flex-wrap: wrap; justify-content: center;")?;
        let input: HtmlInputElement = doc.create_element("input")?.unchecked_into();
        dom::style(
            &input,
            "padding: 10px 12px; border-radius: 10px; border: 1px solid rgba(255,255,255,0.3); background: rgba(0,0,0,0.25); color: inherit; font-size: 16px; min-width: 220px;",
        )?;
        input.set_type("text");
        input.set_placeholder("Digite a senha");
        input.set_attribute("autocomplete", "off")?;
        let submit = ui::button(doc, "Desbloquear", ui::BUTTON)?;
        submit.set_type("submit");
        submit.set_disabled(true);
        form.append_child(&input)?;
        form.append_child(&submit)?;
        card.append_child(&form)?;
        let error = dom::text_element(doc, "p", ui::ERROR, "")?;
        dom::set_visible(&error, false)?;
        card.append_child(&error)?;

        // Media and clue, hidden until the password is accepted.
        let media = dom::element(doc, "div")?;
        dom::style(&media, "display: grid; gap: 12px; width: 100%; justify-items: center;")?;
        dom::set_visible(&media, false)?;
        let video: HtmlVideoElement = doc.create_element("video")?.unchecked_into();
        dom::style(&video, "width: 100%; border-radius: 12px; background: #000;")?;
        video.set_controls(true);
        video.set_attribute("playsinline", "")?;
        video.set_attribute("preload", "metadata")?;
        media.append_child(&video)?;

        let controls = dom::element(doc, "div")?;
        dom::style(&controls, "display: flex; gap: 8px;")?;
        let restart = ui::button(doc, "Assistir novamente", ui::BUTTON_QUIET)?;
        let fullscreen = ui::button(doc, "Tela cheia", ui::BUTTON_QUIET)?;
        controls.append_child(&restart)?;
        controls.append_child(&fullscreen)?;
        media.append_child(&controls)?;

        let failure = dom::element(doc, "div")?;
        dom::style(&failure, "display: grid; gap: 8px; justify-items: center;")?;
        failure.append_child(&dom::text_element(doc, "p", ui::ERROR, MEDIA_ERROR_MESSAGE)?.into())?;
        let unlock_now = ui::button(doc, "Liberar agora", ui::BUTTON)?;
        failure.append_child(&unlock_now)?;
        dom::set_visible(&failure, false)?;
        media.append_child(&failure)?;

        let locked_note = dom::text_element(
            doc,
            "p",
            ui::MUTED,
            "Assista ao vídeo até o fim para liberar a pista.",
        )?;
        media.append_child(&locked_note)?;

        let clue_panel = dom::element(doc, "div")?;
        dom::style(
            &clue_panel,
            "display: grid; gap: 10px; padding: 16px; border-radius: 12px; background: rgba(224,184,90,0.12); width: 100%; box-sizing: border-box;",
        )?;
        clue_panel.append_child(&dom::text_element(
            doc,
            "p",
            "margin: 0; font-size: 18px;",
            &entry.message,
        )?.into())?;
        if let Some(clue) = &entry.clue {
            clue_panel.append_child(&dom::text_element(
                doc,
                "p",
                "margin: 0; font-size: 16px; font-weight: 600;",
                clue,
            )?.into())?;
        }
        let footer = match next {
            Some(next) => format!("O QR code do enigma {} está no próximo local.", next.path),
            None => String::from("Este é o último enigma."),
        };
        clue_panel.append_child(&dom::text_element(doc, "p", ui::MUTED, &footer)?.into())?;
        dom::set_visible(&clue_panel, false)?;
        media.append_child(&clue_panel)?;
        card.append_child(&media)?;

        // Confirmation prompt overlay.
        let prompt = dom::element(doc, "div")?;
        dom::style(&prompt, ui::OVERLAY)?;
        let dialog = dom::element(doc, "div")?;
        dom::style(&dialog, ui::DIALOG)?;
        dialog.append_child(&dom::text_element(
            doc,
            "h2",
            "margin: 0; font-size: 22px;",
            "Você leu a pista?",
        )?.into())?;
        let prompt_seconds = dom::text_element(doc, "p", ui::MUTED, "")?;
        dialog.append_child(&prompt_seconds)?;
        let confirm = ui::button(doc, "Sim, li a pista", ui::BUTTON)?;
        let back = ui::button(doc, "Voltar à pista", ui::BUTTON_QUIET)?;
        dialog.append_child(&confirm)?;
        dialog.append_child(&back)?;
        prompt.append_child(&dialog)?;
        dom::set_visible(&prompt, false)?;
        shell.root.append_child(&prompt)?;

        Ok(Self {
            form,
            input,
            submit,
            error,
            media,
            video,
            restart,
            fullscreen,
            failure,
            unlock_now,
            locked_note,
            clue_panel,
            prompt,
            prompt_seconds,
            confirm,
            back,
        })
    }
}

struct RiddleView {
    shell: Rc<Shell>,
    step: String,
    /// Loaded once the password is accepted.
    video_source: String,
    /// Numeric step for trace events.
    index: usize,
    ui: RiddleUi,
    gate: RefCell<PasswordGate>,
    viewer: RefCell<Option<MediaViewer>>,
    prompt: RefCell<Option<ConfirmPrompt>>,
    prompt_timer: Cell<Option<SubscriptionId>>,
    /// Deadline the pending viewer poll was scheduled for.
    poll_at: Cell<Option<Timestamp>>,
}

pub(crate) fn mount(shell: &Rc<Shell>, step: &str, subs: &mut Subscriptions) -> Result<(), JsValue> {
    let riddles = &shell.config.riddles;
    let Some(entry) = riddles.get_by_path(step) else {
        shell.redirect(&Route::Gate);
        return Ok(());
    };
    let ui = RiddleUi::build(shell, entry, riddles.next(step))?;

    let view = Rc::new(RiddleView {
        shell: Rc::clone(shell),
        step: step.to_string(),
        video_source: entry.video_source.clone(),
        index: step.parse().unwrap_or(0),
        gate: RefCell::new(PasswordGate::new(entry.password.clone())),
        viewer: RefCell::new(None),
        prompt: RefCell::new(None),
        prompt_timer: Cell::new(None),
        poll_at: Cell::new(None),
        ui,
    });

    listen(&view, &view.ui.input, "input", subs, |v, _| v.on_input())?;
    listen(&view, &view.ui.form, "submit", subs, |v, e| {
        e.prevent_default();
        v.on_submit();
    })?;
    listen(&view, &view.ui.video, "timeupdate", subs, |v, _| {
        let (current, duration) = (v.ui.video.current_time(), v.ui.video.duration());
        let unlocked = v.with_viewer(|m| m.time_update(current, duration));
        v.after_viewer(unlocked);
    })?;
    listen(&view, &view.ui.video, "ended", subs, |v, _| {
        let unlocked = v.with_viewer(MediaViewer::ended);
        v.after_viewer(unlocked);
    })?;
    listen(&view, &view.ui.video, "error", subs, |v, _| v.on_media_error())?;
    listen(&view, &view.ui.unlock_now, "click", subs, |v, _| {
        let unlocked = v.with_viewer(MediaViewer::unlock_now);
        v.after_viewer(unlocked);
    })?;
    listen(&view, &view.ui.restart, "click", subs, |v, _| v.on_restart())?;
    listen(&view, &view.ui.fullscreen, "click", subs, |v, _| {
        if let Err(err) = screen::request_fullscreen(&v.ui.video) {
            v.shell.host_error(HostOp::Fullscreen, &err);
        }
    })?;
    listen(&view, &view.shell.doc, "fullscreenchange", subs, |v, _| v.on_fullscreen_change())?;
    listen(&view, &view.ui.confirm, "click", subs, |v, _| v.on_confirm())?;
    listen(&view, &view.ui.back, "click", subs, |v, _| v.on_back())?;

    let shell = Rc::clone(shell);
    subs.push(
        SubscriptionKind::Cleanup,
        OnCancel::new(move || {
            if let Err(err) = screen::apply_orientation(OrientationRequest::Unlock, |_| {}) {
                shell.host_error(HostOp::Orientation, &err);
            }
        }),
    );

    Ok(())
}

/// Registers `f` for `kind` events on `target` for as long as the view lives.
fn listen(
    view: &Rc<RiddleView>,
    target: &EventTarget,
    kind: &'static str,
    subs: &mut Subscriptions,
    f: fn(&Rc<RiddleView>, Event),
) -> Result<(), JsValue> {
    let view = Rc::clone(view);
    let listener = Listener::new(target, kind, move |e| f(&view, e))?;
    subs.push(SubscriptionKind::Listener, listener);
    Ok(())
}

impl RiddleView {
    fn on_input(&self) {
        self.gate.borrow_mut().edit(&self.ui.input.value());
        self.refresh_form();
    }

    fn refresh_form(&self) {
        let gate = self.gate.borrow();
        self.ui.submit.set_disabled(!gate.can_submit());
        let error = gate.error();
        self.ui.error.set_text_content(error);
        if let Err(err) = dom::set_visible(&self.ui.error, error.is_some()) {
            self.shell.host_error(HostOp::Dom, &err);
        }
    }

    fn on_submit(self: &Rc<Self>) {
        let at = now();
        let outcome = self.gate.borrow_mut().submit(at);
        if outcome != SubmitOutcome::Empty {
            self.shell.trace(|t| {
                t.password_attempt(&PasswordAttemptEvent {
                    at,
                    step: self.index,
                    outcome,
                });
            });
        }
        match outcome {
            SubmitOutcome::Accepted => self.reveal_media(),
            SubmitOutcome::Rejected => {
                self.ui.input.set_value("");
                self.refresh_form();
                let view = Rc::clone(self);
                let expire = Timeout::new(ERROR_DISPLAY, move || {
                    if view.gate.borrow_mut().expire_error(now()) {
                        view.refresh_form();
                    }
                });
                self.shell
                    .with_subs(|subs| subs.push(SubscriptionKind::Timeout, expire));
            }
            SubmitOutcome::Empty => {}
        }
    }

    fn reveal_media(self: &Rc<Self>) {
        let result = dom::set_visible(&self.ui.form, false)
            .and_then(|()| dom::set_visible(&self.ui.error, false))
            .and_then(|()| dom::set_visible(&self.ui.media, true));
        if let Err(err) = result {
            self.shell.host_error(HostOp::Dom, &err);
        }
        *self.viewer.borrow_mut() = Some(MediaViewer::new(self.shell.config.unlock, now()));
        self.ui.video.set_src(&self.video_source);
        self.schedule_viewer_poll();
    }

    fn with_viewer(
        &self,
        f: impl FnOnce(&mut MediaViewer) -> Option<UnlockReason>,
    ) -> Option<UnlockReason> {
        self.viewer.borrow_mut().as_mut().and_then(f)
    }

    /// Applies an unlock, if any, and rearms the time-based triggers.
    fn after_viewer(self: &Rc<Self>, unlocked: Option<UnlockReason>) {
        match unlocked {
            Some(reason) => self.on_unlock(reason),
            None => self.schedule_viewer_poll(),
        }
    }

    fn on_media_error(self: &Rc<Self>) {
        let unlocked = self.with_viewer(|m| m.error(now()));
        if unlocked.is_none()
            && let Err(err) = dom::set_visible(&self.ui.failure, true)
        {
            self.shell.host_error(HostOp::Dom, &err);
        }
        self.after_viewer(unlocked);
    }

    fn schedule_viewer_poll(self: &Rc<Self>) {
        let deadline = self.viewer.borrow().as_ref().and_then(MediaViewer::next_deadline);
        let Some(deadline) = deadline else {
            return;
        };
        if self.poll_at.get() == Some(deadline) {
            return;
        }
        self.poll_at.set(Some(deadline));
        let view = Rc::clone(self);
        let poll = Timeout::new(deadline.saturating_duration_since(now()), move || {
            view.poll_at.set(None);
            let unlocked = view.with_viewer(|m| m.poll(now()));
            view.after_viewer(unlocked);
        });
        self.shell
            .with_subs(|subs| subs.push(SubscriptionKind::Timeout, poll));
    }

    fn on_unlock(self: &Rc<Self>, reason: UnlockReason) {
        let at = now();
        self.shell.trace(|t| {
            t.unlock(&UnlockEvent {
                at,
                step: self.index,
                reason,
            });
        });
        let result = dom::set_visible(&self.ui.failure, false)
            .and_then(|()| dom::set_visible(&self.ui.locked_note, false))
            .and_then(|()| dom::set_visible(&self.ui.clue_panel, true));
        if let Err(err) = result {
            self.shell.host_error(HostOp::Dom, &err);
        }
        if self.shell.config.is_prompt_step(&self.step) {
            self.arm_prompt(at);
        }
    }

    fn on_restart(&self) {
        let effect = self.viewer.borrow_mut().as_mut().map(MediaViewer::restart);
        if let Some(PlaybackEffect::SeekToStart) = effect {
            self.ui.video.set_current_time(0.0);
            if let Err(err) = self.ui.video.play() {
                self.shell.host_error(HostOp::Dom, &err);
            }
        }
    }

    fn on_fullscreen_change(&self) {
        let request = MediaViewer::fullscreen_changed(screen::is_fullscreen(&self.shell.doc));
        let shell = Rc::clone(&self.shell);
        let applied = screen::apply_orientation(request, move |reason| {
            shell.host_error(HostOp::Orientation, &reason);
        });
        if let Err(err) = applied {
            self.shell.host_error(HostOp::Orientation, &err);
        }
    }

    fn arm_prompt(self: &Rc<Self>, unlocked_at: Timestamp) {
        *self.prompt.borrow_mut() = Some(ConfirmPrompt::new(self.shell.config.prompt, unlocked_at));
        let view = Rc::clone(self);
        let timer = Interval::new(PROMPT_POLL, move || view.poll_prompt());
        let id = self
            .shell
            .with_subs(|subs| subs.push(SubscriptionKind::Interval, timer));
        self.prompt_timer.set(id);
    }

    fn poll_prompt(self: &Rc<Self>) {
        let at = now();
        let (event, seconds, phase) = {
            let mut prompt = self.prompt.borrow_mut();
            let Some(prompt) = prompt.as_mut() else {
                return;
            };
            let event = prompt.poll(at);
            (event, prompt.seconds_left(at), prompt.phase())
        };
        match event {
            Some(PromptEvent::Shown) => self.set_prompt_visible(true),
            Some(PromptEvent::AutoConfirmed) => {
                self.set_prompt_visible(false);
                self.shell.navigate(Route::Final.path());
            }
            None => {}
        }
        if let Some(seconds) = seconds {
            self.ui.prompt_seconds.set_text_content(Some(&format!(
                "Seguindo para o mapa em {seconds} s"
            )));
        }
        if matches!(phase, PromptPhase::Confirmed | PromptPhase::Dismissed) {
            self.stop_prompt_timer();
        }
    }

    fn on_confirm(self: &Rc<Self>) {
        let go = self
            .prompt
            .borrow_mut()
            .as_mut()
            .is_some_and(ConfirmPrompt::confirm_read);
        if go {
            self.stop_prompt_timer();
            self.shell.navigate(Route::Final.path());
        }
    }

    fn on_back(&self) {
        if let Some(prompt) = self.prompt.borrow_mut().as_mut() {
            prompt.return_to_clue();
        }
        self.stop_prompt_timer();
        self.set_prompt_visible(false);
    }

    fn stop_prompt_timer(&self) {
        if let Some(id) = self.prompt_timer.take() {
            self.shell.with_subs(|subs| subs.cancel(id));
        }
    }

    fn set_prompt_visible(&self, visible: bool) {
        if let Err(err) = dom::set_visible(&self.ui.prompt, visible) {
            self.shell.host_error(HostOp::Dom, &err);
        }
    }
}
