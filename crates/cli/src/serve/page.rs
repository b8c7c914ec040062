//! The embedded form front-end: one static page driving the JSON API.
//!
//! `{{title}}` is substituted with the template name when served.

pub(crate) const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>proof - {{title}}</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }
  h1 code { background: #f4f4f4; padding: 0 .3rem; border-radius: 4px; }
  .columns { display: flex; gap: 2rem; align-items: flex-start; }
  #form { flex: 2; }
  #context { flex: 1; background: #f8f8f8; border-radius: 6px; padding: 1rem; }
  #context pre { white-space: pre-wrap; word-break: break-all; font-size: .85rem; }
  .field { margin-bottom: 1rem; }
  .field label { display: block; font-weight: 600; margin-bottom: .25rem; }
  .field .desc { font-weight: 400; color: #666; }
  .field input[type=text] { width: 100%; padding: .4rem; box-sizing: border-box; }
  .field input:disabled { background: #eee; color: #555; }
  .field .expr { font-size: .8rem; color: #888; }
  .field .error { color: #b00020; font-size: .85rem; margin-top: .25rem; }
  .group { border-left: 3px solid #ddd; padding-left: 1rem; margin: .5rem 0 1rem; }
  #bake { font-size: 1.1rem; padding: .5rem 1.5rem; cursor: pointer; }
  #status { margin-top: 1rem; }
  #status.ok { color: #1a7f37; }
  #status.fail { color: #b00020; }
</style>
</head>
<body>
<h1>&#127850; proof - <code>{{title}}</code></h1>
<div class="columns">
  <div id="form"></div>
  <div id="context"><h3>Cookiecutter context</h3><pre id="context-json"></pre></div>
</div>
<button id="bake">Bake &#127850;</button>
<div id="status"></div>
<script>
"use strict";

const formEl = document.getElementById("form");
const contextEl = document.getElementById("context-json");
const statusEl = document.getElementById("status");
let missingNames = [];

async function refresh() {
  const res = await fetch("/form");
  render(await res.json());
}

async function setValue(name, value) {
  const res = await fetch("/values", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ name, value }),
  });
  if (res.ok) {
    render(await res.json());
  } else {
    const body = await res.json();
    setStatus(body.error || "invalid value", false);
  }
}

function fieldNode(field) {
  const wrap = document.createElement("div");
  wrap.className = "field";

  const label = document.createElement("label");
  label.textContent = field.label;
  if (field.description) {
    const desc = document.createElement("span");
    desc.className = "desc";
    desc.textContent = " - " + field.description;
    label.appendChild(desc);
  }
  wrap.appendChild(label);

  const w = field.widget;
  if (w.kind === "text") {
    const input = document.createElement("input");
    input.type = "text";
    input.value = w.value;
    input.placeholder = w.placeholder || "";
    input.disabled = !field.editable;
    input.addEventListener("change", () => setValue(field.name, input.value));
    wrap.appendChild(input);
    if (w.expression) {
      const note = document.createElement("div");
      note.className = "expr";
      note.textContent = "generated: " + w.expression;
      wrap.appendChild(note);
    }
  } else if (w.kind === "choice") {
    for (const option of w.options) {
      const line = document.createElement("label");
      const radio = document.createElement("input");
      radio.type = "radio";
      radio.name = field.name;
      radio.value = option;
      radio.checked = option === w.selected;
      radio.addEventListener("change", () => setValue(field.name, option));
      line.appendChild(radio);
      line.appendChild(document.createTextNode(" " + option));
      wrap.appendChild(line);
    }
  } else if (w.kind === "group") {
    const group = document.createElement("div");
    group.className = "group";
    for (const child of w.fields) group.appendChild(fieldNode(child));
    wrap.appendChild(group);
  }

  if (field.error) {
    const err = document.createElement("div");
    err.className = "error";
    err.textContent = field.error;
    wrap.appendChild(err);
  }
  if (missingNames.includes(field.name)) {
    const err = document.createElement("div");
    err.className = "error";
    err.textContent = "Parameter \"" + field.name + "\" is missing";
    wrap.appendChild(err);
  }
  return wrap;
}

function render(view) {
  formEl.replaceChildren(...view.fields.map(fieldNode));
  contextEl.textContent = JSON.stringify(view.context, null, 2);
}

function setStatus(message, ok) {
  statusEl.textContent = message;
  statusEl.className = ok ? "ok" : "fail";
}

document.getElementById("bake").addEventListener("click", async () => {
  setStatus("Baking project template...", true);
  const res = await fetch("/bake", { method: "POST" });
  const body = await res.json();
  if (res.ok) {
    missingNames = [];
    setStatus("Project successfully baked: " + body.generated, true);
  } else if (res.status === 422) {
    missingNames = body.missing;
    setStatus(body.messages.join("; "), false);
    await refresh();
  } else {
    setStatus(body.error, false);
  }
});

refresh();
</script>
</body>
</html>
"#;
