//! Browser page served at `/log`.

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Log Viewer</title>
<style>
body { font-family: sans-serif; margin: 1.5rem; }
#files li { cursor: pointer; }
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 2px 6px; text-align: left; }
</style>
</head>
<body data-page-size="{{PAGE_SIZE}}">
<h1>Log Viewer</h1>
<ul id="files"></ul>
<div>
  <button id="prev">&lt;</button> <span id="pos"></span> <button id="next">&gt;</button>
  <button id="export">Export</button> <button id="clear">Clear</button>
  <button id="delete-all">Delete all</button>
</div>
<table><thead><tr><th>time</th><th>level</th><th>msg</th></tr></thead><tbody id="rows"></tbody></table>
<script>
const pageSize = Number(document.body.dataset.pageSize);
let current = null, entries = [], page = 0;
const q = (id) => document.getElementById(id);
async function call(url, opts) { const r = await fetch(url, opts); return r.json(); }
function draw() {
  const rows = entries.slice(page * pageSize, (page + 1) * pageSize);
  q("rows").innerHTML = "";
  for (const e of rows) {
    const tr = document.createElement("tr");
    for (const k of ["time", "level", "msg"]) {
      const td = document.createElement("td"); td.textContent = e[k]; tr.appendChild(td);
    }
    q("rows").appendChild(tr);
  }
  q("pos").textContent = entries.length ? `${page + 1} / ${Math.ceil(entries.length / pageSize)}` : "";
}
async function open(name) {
  current = name; page = 0;
  const res = await call(`/log/getFileContent?name=${encodeURIComponent(name)}`);
  entries = res.data || []; draw();
}
async function load() {
  const res = await call("/log/getLogFilesList");
  q("files").innerHTML = "";
  for (const f of res.files || []) {
    const li = document.createElement("li"); li.textContent = f; li.onclick = () => open(f);
    q("files").appendChild(li);
  }
}
q("prev").onclick = () => { if (page > 0) { page--; draw(); } };
q("next").onclick = () => { if ((page + 1) * pageSize < entries.length) { page++; draw(); } };
q("export").onclick = async () => {
  if (!current) return;
  const res = await call(`/log/exportFile?name=${encodeURIComponent(current)}`);
  if (res.code !== 200) { alert(res.msg); return; }
  const a = document.createElement("a");
  a.href = URL.createObjectURL(new Blob([res.data], { type: "text/plain" }));
  a.download = current; a.click();
};
q("clear").onclick = async () => {
  if (!current) return;
  const res = await call("/log/clearFileContent", { method: "POST",
    headers: { "Content-Type": "application/x-www-form-urlencoded" },
    body: `name=${encodeURIComponent(current)}` });
  if (res.code !== 200) alert(res.msg); else open(current);
};
q("delete-all").onclick = async () => {
  const res = await call("/log/deleteAllFiles", { method: "POST" });
  if (res.code !== 200) alert(res.msg); else { entries = []; draw(); load(); }
};
load();
</script>
</body>
</html>
"#;

/// Render the page with the configured page size.
pub fn render(page_size: usize) -> String {
    TEMPLATE.replace("{{PAGE_SIZE}}", &page_size.to_string())
}
