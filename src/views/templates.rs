//! Handlebars templates for every page
//!
//! Pages render their body first; the layout then wraps it with the shared
//! head, header, footer and site-wide ad placements.

pub const LAYOUT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{meta.title}}</title>
{{#if meta.description}}<meta name="description" content="{{meta.description}}">{{/if}}
<meta name="robots" content="index, follow, max-video-preview:-1, max-image-preview:large, max-snippet:-1">
{{#if meta.canonical}}<link rel="canonical" href="{{meta.canonical}}">{{/if}}
<meta property="og:site_name" content="{{chrome.site_name}}">
<meta property="og:title" content="{{meta.og_title}}">
{{#if meta.og_description}}<meta property="og:description" content="{{meta.og_description}}">{{/if}}
<meta property="og:type" content="{{meta.og_type}}">
{{#if meta.canonical}}<meta property="og:url" content="{{meta.canonical}}">{{/if}}
{{#if meta.og_image}}<meta property="og:image" content="{{meta.og_image}}">{{/if}}
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:title" content="{{meta.twitter_title}}">
{{#if meta.twitter_image}}<meta name="twitter:image" content="{{meta.twitter_image}}">{{/if}}
{{#if json_ld}}<script type="application/ld+json">{{{json_ld}}}</script>{{/if}}
<style>
body{margin:0;background:#111;color:#eee;font-family:system-ui,sans-serif}
a{color:inherit}
.site-header{display:flex;gap:1.5rem;align-items:center;padding:1rem 2rem;background:#000}
.site-header nav{display:flex;gap:1rem}
main{padding:1.5rem 2rem;min-height:70vh}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(160px,1fr));gap:1rem}
.card img{width:100%;aspect-ratio:2/3;object-fit:cover;border-radius:6px}
.ad-slot{display:flex;justify-content:center;margin:1rem 0}
.player iframe{width:100%;aspect-ratio:16/9;border:0}
.server.active{background:#c00}
.muted{color:#999}
.site-footer{padding:2rem;text-align:center;background:#000}
.search-overlay{position:fixed;inset:0;z-index:100;background:rgba(0,0,0,.85);padding:2rem;overflow-y:auto}
.search-overlay[hidden]{display:none}
.search-overlay input{width:100%;padding:.75rem 1rem;font-size:1rem;background:#222;color:#eee;border:1px solid #444;border-radius:6px}
</style>
</head>
<body>
<header class="site-header">
<a class="logo" href="/">{{chrome.site_name}}</a>
<nav>
<a href="/">Home</a>
<a href="/series">Series</a>
<a href="/movies">Movies</a>
<a href="/new">New</a>
<a href="/popular">Popular</a>
<a href="/categories">Categories</a>
</nav>
<button type="button" id="search-open" class="search-open">Search</button>
</header>
<div id="search-overlay" class="search-overlay" hidden data-delay="{{chrome.search_delay_ms}}" data-min-length="{{chrome.search_min_len}}">
<div class="search-head">
<h2>Search</h2>
<button type="button" id="search-close">Close</button>
</div>
<input id="search-input" type="search" placeholder="Search for an anime..." autocomplete="off">
<p id="search-status" class="muted">Start typing to see results.</p>
<div id="search-results" class="grid"></div>
</div>
<main>
{{{body}}}
</main>
<footer class="site-footer">
{{#if chrome.footer_script}}<div class="ad-slot ad-footer">{{{chrome.footer_script}}}</div>{{/if}}
{{#if chrome.direct_link}}<p><a class="direct-link" href="{{chrome.direct_link}}" target="_blank" rel="noopener noreferrer">Click Here to Support</a></p>{{/if}}
<p>&copy; {{chrome.year}} {{chrome.site_name}}. All Rights Reserved.</p>
</footer>
{{#if chrome.popunder_script}}<div id="popunder-script">{{{chrome.popunder_script}}}</div>{{/if}}
<script>
(function () {
  var overlay = document.getElementById('search-overlay');
  var input = document.getElementById('search-input');
  var status = document.getElementById('search-status');
  var results = document.getElementById('search-results');
  var delay = parseInt(overlay.dataset.delay, 10);
  var minLength = parseInt(overlay.dataset.minLength, 10);
  var timer = null;
  var latest = '';
  function card(item) {
    var a = document.createElement('a');
    a.className = 'card';
    a.href = '/anime/' + encodeURIComponent(item.slug);
    if (item.coverImage) {
      var img = document.createElement('img');
      img.src = item.coverImage;
      img.alt = item.title;
      a.appendChild(img);
    }
    var title = document.createElement('span');
    title.className = 'card-title';
    title.textContent = item.title;
    a.appendChild(title);
    return a;
  }
  function search(query) {
    latest = query;
    results.textContent = '';
    if (query.length === 0) {
      status.textContent = 'Start typing to see results.';
      return;
    }
    if (query.length < minLength) {
      status.textContent = '';
      return;
    }
    status.textContent = 'Searching...';
    fetch('/api/search?q=' + encodeURIComponent(query))
      .then(function (r) { return r.json(); })
      .then(function (res) {
        if (query !== latest) return;
        var items = res.success ? res.data : [];
        items.forEach(function (item) { results.appendChild(card(item)); });
        status.textContent = items.length ? '' : 'No results found for "' + query + '".';
      })
      .catch(function () {
        if (query === latest) status.textContent = 'No results found for "' + query + '".';
      });
  }
  input.addEventListener('input', function () {
    clearTimeout(timer);
    var query = input.value.trim();
    timer = setTimeout(function () { search(query); }, delay);
  });
  document.getElementById('search-open').addEventListener('click', function () {
    overlay.hidden = false;
    input.focus();
  });
  document.getElementById('search-close').addEventListener('click', function () {
    overlay.hidden = true;
  });
})();
</script>
</body>
</html>
"#;

pub const CARD_PARTIAL: &str = r#"<a class="card" href="/anime/{{slug}}">
{{#if cover_image}}<img src="{{cover_image}}" alt="{{title}}" loading="lazy">{{/if}}
<span class="card-title">{{title}}</span>
{{#if media_type}}<span class="card-type">{{media_type}}</span>{{/if}}
</a>"#;

pub const HOME_TEMPLATE: &str = r#"{{#if hero}}
<section class="hero">
{{#each hero}}
<article class="hero-item">
{{#if bannerImage}}<img src="{{bannerImage}}" alt="{{title}}">{{/if}}
<h2><a href="/anime/{{slug}}">{{title}}</a></h2>
<p>{{description}}</p>
</article>
{{/each}}
</section>
{{/if}}
{{#if leaderboard_desktop}}<div class="ad-slot ad-leaderboard-desktop">{{{leaderboard_desktop}}}</div>{{/if}}
{{#if leaderboard_mobile}}<div class="ad-slot ad-leaderboard-mobile">{{{leaderboard_mobile}}}</div>{{/if}}
<div class="home-layout">
<section class="latest">
<h1>Latest Updates</h1>
{{#if error}}
<p class="error">{{error}}</p>
{{else}}
<div class="grid">
{{#each items}}{{> card}}{{/each}}
</div>
{{/if}}
</section>
{{#if sidebar}}<aside class="ad-slot ad-sidebar">{{{sidebar}}}</aside>{{/if}}
</div>
"#;

pub const GRID_TEMPLATE: &str = r#"<h1>{{heading}}</h1>
{{#if description}}<p class="muted">{{description}}</p>{{/if}}
{{#if sortable}}
<form class="filters" method="get" action="{{path}}">
{{#each hidden}}<input type="hidden" name="{{name}}" value="{{value}}">{{/each}}
<label>Order by
<select name="orderby" onchange="this.form.submit()">
<option value="date"{{#if order_date}} selected{{/if}}>Latest</option>
<option value="title"{{#if order_title}} selected{{/if}}>Title</option>
</select>
</label>
</form>
{{/if}}
{{#if empty}}
<p class="empty">{{empty_text}}</p>
{{else}}
<div id="catalog-grid" class="grid" data-next-page="{{next_page}}" data-has-more="{{has_more}}" data-query="{{query}}" data-count="{{count}}" data-ad-cadence="{{cadence}}" data-threshold="{{threshold}}" data-end-text="{{end_text}}">
{{#each cells}}
{{#if ad}}<div class="ad-slot ad-native" data-key="{{key}}">{{{../native_script}}}</div>{{else}}{{> card}}{{/if}}
{{/each}}
</div>
{{#if native_script}}<template id="native-ad">{{{native_script}}}</template>{{/if}}
<p id="grid-status" class="muted">{{#unless has_more}}{{end_text}}{{/unless}}</p>
<script>
(function () {
  var grid = document.getElementById('catalog-grid');
  var status = document.getElementById('grid-status');
  var ad = document.getElementById('native-ad');
  var page = parseInt(grid.dataset.nextPage, 10);
  var hasMore = grid.dataset.hasMore === 'true';
  var count = parseInt(grid.dataset.count, 10);
  var cadence = parseInt(grid.dataset.adCadence, 10);
  var threshold = parseInt(grid.dataset.threshold, 10);
  var loading = false;
  function card(item) {
    var a = document.createElement('a');
    a.className = 'card';
    a.href = '/anime/' + encodeURIComponent(item.slug);
    if (item.coverImage) {
      var img = document.createElement('img');
      img.src = item.coverImage;
      img.alt = item.title;
      img.loading = 'lazy';
      a.appendChild(img);
    }
    var title = document.createElement('span');
    title.className = 'card-title';
    title.textContent = item.title;
    a.appendChild(title);
    return a;
  }
  function loadMore() {
    if (loading || !hasMore) return;
    loading = true;
    status.textContent = 'Loading...';
    fetch('/api/catalog?page=' + page + grid.dataset.query)
      .then(function (r) { return r.json(); })
      .then(function (res) {
        var data = res.data;
        data.items.forEach(function (item) {
          grid.appendChild(card(item));
          count += 1;
          if (ad && count % cadence === 0) {
            var slot = document.createElement('div');
            slot.className = 'ad-slot ad-native';
            slot.appendChild(ad.content.cloneNode(true));
            grid.appendChild(slot);
          }
        });
        page = data.currentPage + 1;
        hasMore = data.hasMore;
      })
      .catch(function () { hasMore = false; })
      .then(function () {
        loading = false;
        status.textContent = hasMore ? '' : grid.dataset.endText;
      });
  }
  window.addEventListener('scroll', function () {
    var distance = grid.getBoundingClientRect().bottom - window.innerHeight;
    if (distance < threshold) loadMore();
  });
})();
</script>
{{/if}}
"#;

pub const POPULAR_TEMPLATE: &str = r#"<h1>{{heading}}</h1>
{{#if error}}
<p class="error">{{error}}</p>
{{else}}
<div class="grid">
{{#each items}}{{> card}}{{/each}}
</div>
{{/if}}
"#;

pub const CATEGORIES_TEMPLATE: &str = r#"<h1>Categories</h1>
<ul class="categories">
{{#each genres}}
<li><a href="/series?genres={{slug}}">{{name}}</a></li>
{{/each}}
</ul>
"#;

pub const DETAIL_TEMPLATE: &str = r#"<article class="anime-detail">
<div class="detail-head">
{{#if anime.cover_image}}<img class="cover" src="{{anime.cover_image}}" alt="{{anime.title}}">{{/if}}
<div>
<h1>{{anime.title}}</h1>
{{#if anime.alternative_name}}<p class="muted">{{anime.alternative_name}}</p>{{/if}}
<ul class="facts">
{{#if anime.media_type}}<li>Type: {{anime.media_type}}</li>{{/if}}
{{#if anime.status}}<li>Status: {{anime.status}}</li>{{/if}}
{{#if anime.release_year}}<li>Released: {{anime.release_year}}</li>{{/if}}
</ul>
{{#if anime.genres}}<p class="genres">{{#each anime.genres}}<span class="genre">{{this}}</span> {{/each}}</p>{{/if}}
{{#if first_episode}}
<a class="watch-button" href="/watch/{{anime.slug}}/{{first_episode}}">START WATCHING E1</a>
{{else}}
<span class="watch-button disabled">NO EPISODES</span>
{{/if}}
</div>
</div>
<div class="synopsis">{{{anime.description}}}</div>
{{#if sidebar}}<aside class="ad-slot ad-sidebar">{{{sidebar}}}</aside>{{/if}}
<section class="episodes">
<h2>Episodes</h2>
{{#if episodes}}
<ul>
{{#each episodes}}<li><a href="/watch/{{../anime.slug}}/{{slug}}">{{label}}</a></li>{{/each}}
</ul>
{{else}}
<p class="muted">No episodes available</p>
{{/if}}
</section>
</article>
"#;

pub const PLAYER_PARTIAL: &str = r#"{{#if player.embed}}
<div id="player" class="player">{{{player.embed}}}</div>
{{#if player.show_selector}}
<div class="servers">
<h3>Servers</h3>
{{#each player.servers}}<a class="server{{#if active}} active{{/if}}" href="?server={{index}}" data-server="{{index}}">{{name}}</a> {{/each}}
</div>
{{#each player.servers}}<template id="server-{{index}}">{{{embed}}}</template>{{/each}}
<script>
(function () {
  var player = document.getElementById('player');
  document.querySelectorAll('.server').forEach(function (button) {
    button.addEventListener('click', function (event) {
      var source = document.getElementById('server-' + button.dataset.server);
      if (!source) return;
      event.preventDefault();
      player.innerHTML = source.innerHTML;
      document.querySelectorAll('.server').forEach(function (b) { b.classList.remove('active'); });
      button.classList.add('active');
    });
  });
})();
</script>
{{/if}}
{{else}}
<div class="player player-error"><p>{{player.not_found}}</p></div>
{{/if}}"#;

pub const WATCH_TEMPLATE: &str = r#"<article class="watch">
<h1>{{heading}}</h1>
<p><a href="/anime/{{anime_slug}}">{{anime_title}}</a></p>
{{#if gate}}
<div id="ad-gate" class="player-gate" data-remaining="{{gate.remaining}}">
<div class="ad-slot ad-player-loading">{{{gate.script}}}</div>
<p>Your video will start in <span id="ad-gate-countdown">{{gate.remaining}}</span>s</p>
</div>
<template id="player-template">{{> player}}</template>
<script>
(function () {
  var gate = document.getElementById('ad-gate');
  var counter = document.getElementById('ad-gate-countdown');
  var remaining = parseInt(gate.dataset.remaining, 10);
  var timer = setInterval(function () {
    if (remaining <= 1) {
      clearInterval(timer);
      var content = document.getElementById('player-template').content.cloneNode(true);
      gate.replaceWith(content);
      return;
    }
    remaining -= 1;
    counter.textContent = remaining;
  }, 1000);
})();
</script>
{{else}}
{{> player}}
{{/if}}
<nav class="episode-nav">
{{#if prev}}<a class="prev" href="/watch/{{anime_slug}}/{{prev}}">&laquo; Previous</a>{{/if}}
{{#if next}}<a class="next" href="/watch/{{anime_slug}}/{{next}}">Next &raquo;</a>{{/if}}
</nav>
{{#if sidebar}}<aside class="ad-slot ad-sidebar">{{{sidebar}}}</aside>{{/if}}
<section class="episodes">
<h2>Episodes</h2>
<ul>
{{#each episodes}}<li{{#if current}} class="current"{{/if}}><a href="/watch/{{../anime_slug}}/{{slug}}">{{label}}</a></li>{{/each}}
</ul>
</section>
</article>
"#;

pub const MESSAGE_TEMPLATE: &str = r#"<section class="message">
<h1>{{heading}}</h1>
<p>{{message}}</p>
<p><a href="/">Back to home</a></p>
</section>
"#;

/// Served when rendering itself failed
pub const FALLBACK_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Something went wrong</title></head>
<body><h1>Something went wrong</h1><p>Please try again later.</p><p><a href="/">Back to home</a></p></body>
</html>
"#;
