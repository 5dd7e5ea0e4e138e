use crate::{
    types::{Device, UserProfile},
    utils::html_escape,
};

const CONTROL_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="UTF-8"><title>spotremote</title></head>
  <body style="font-family:sans-serif;max-width:40em;margin:2em auto">
    <h1>Hello, {{NAME}}</h1>
    <h3>Devices</h3>
    <ul style="list-style:none;padding:0">{{DEVICES}}</ul>
    <p>
      <button onclick="send('/play', {})">Play</button>
      <button onclick="send('/pause', {})">Pause</button>
      <button onclick="send('/shuffle', {})">Toggle shuffle</button>
    </p>
    <p>
      <label>Volume
        <input id="volume" type="range" min="0" max="100" value="{{VOLUME}}"
               onchange="send('/volume', {volume_percent: Number(this.value)})">
      </label>
    </p>
    <p id="result"></p>
    <script>
      function device() {
        const selected = document.querySelector('input[name=device]:checked');
        return selected ? selected.value : null;
      }
      async function send(path, body) {
        const res = await fetch(path, {
          method: 'POST',
          headers: {'Content-Type': 'application/json'},
          body: JSON.stringify(Object.assign({device_id: device()}, body)),
        });
        document.getElementById('result').textContent = await res.text();
      }
    </script>
  </body>
</html>
"#;

const MESSAGE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="UTF-8"><title>spotremote</title></head>
  <body style="font-family:sans-serif;text-align:center;padding-top:3em">
    <h2>{{TITLE}}</h2>
    <p>{{MESSAGE}}</p>
    <p><a href="/">Log in with Spotify</a></p>
  </body>
</html>
"#;

fn device_item(device: &Device) -> String {
    let name = html_escape(&device.name);
    let kind = html_escape(&device.device_type);
    match &device.id {
        Some(id) => format!(
            r#"<li><label><input type="radio" name="device" value="{}"{}> {} ({}){}</label></li>"#,
            html_escape(id),
            if device.is_active { " checked" } else { "" },
            name,
            kind,
            if device.is_active { " - active" } else { "" },
        ),
        None => format!("<li>{} ({}) - cannot be controlled</li>", name, kind),
    }
}

pub fn control_page(profile: Option<&UserProfile>, devices: &[Device]) -> String {
    let name = profile.map(|p| p.name()).unwrap_or("Spotify user");
    let items = if devices.is_empty() {
        "<li>No devices found. Open Spotify on a device and reload.</li>".to_string()
    } else {
        devices.iter().map(device_item).collect::<Vec<_>>().join("\n")
    };
    let volume = devices
        .iter()
        .find(|d| d.is_active)
        .and_then(|d| d.volume_percent)
        .unwrap_or(50);

    CONTROL_PAGE
        .replace("{{NAME}}", &html_escape(name))
        .replace("{{DEVICES}}", &items)
        .replace("{{VOLUME}}", &volume.to_string())
}

pub fn message_page(title: &str, message: &str) -> String {
    MESSAGE_PAGE
        .replace("{{TITLE}}", &html_escape(title))
        .replace("{{MESSAGE}}", &html_escape(message))
}
