pub(crate) const MESSAGES: &[(&str, &str)] = &[
    (
        "help_intro",
        "<pre>{{ Help }}</pre>\n\nFor more information on each command please type <code>/help &lt;command&gt;</code>.",
    ),
    (
        "help_method",
        "<pre>/{{ MainName }} {{ Argstr }}</pre>\n{{ Help }}\n{% if HasInline %}<b>Inline query</b>: can also be called as an inline query from group or personal chats, e.g. <code>@{{ ServiceId }} {{ InlineExample }}</code>.\n{% endif %}{% if Aliases %}<b>Aliases:</b> <code>{{ Aliases | join(\", \") }}</code>{% endif %}",
    ),
    (
        "help_similar",
        "<code>{{ Method }}</code> command not found. Do you mean {% for name in Similar %}<code>{{ name }}</code>{% if not loop.last %} or {% endif %}{% endfor %}?",
    ),
    (
        "wrong_command",
        "Could not understand the command. /help",
    ),
    (
        "welcome",
        "Your account is created. You can now receive and send satoshis in this chat or in any group this bot is in.",
    ),
    (
        "tutorial",
        "{% if Name %}Tutorial <b>{{ Name }}</b>: type /help {{ Name }} to see how it works.{% else %}Type /help to see everything this bot can do.{% endif %}",
    ),
    (
        "stop_notify",
        "Notifications stopped.",
    ),
    ("error", "Error{% if Err %}: {{ Err }}{% endif %}"),
    (
        "invalid_amount",
        "Invalid amount: {{ Amount }}",
    ),
    (
        "invalid_participants",
        "Number of participants should be between 2 and 100, got {{ Number }}.",
    ),
    (
        "insufficient_balance",
        "Insufficient balance for {{ Purpose }}. Needs {{ Sats }} sat.",
    ),
    (
        "rate_limit",
        "You're rate-limited! Please wait before creating another game.",
    ),
    (
        "over_quota",
        "You're over your quota for {{ App }} today.",
    ),
    (
        "cant_send_no_receiver",
        "Can't send {{ Sats }} sat: receiver is missing.",
    ),
    (
        "save_receiver_fail",
        "Failed to load receiver. This is probably a bug.",
    ),
    (
        "failed_user",
        "Failed to parse receiver name.",
    ),
    (
        "failed_send",
        "Failed to send: {{ Err }}",
    ),
    (
        "user_sent_you_sats",
        "{{ User }} has sent you {{ Sats }} sat{% if RawSats != Sats %} ({{ RawSats }}){% endif %}.{% if Note %}\n<i>{{ Note }}</i>{% endif %}",
    ),
    (
        "received_sats_anon",
        "Someone has sent you {{ Sats }} sat.",
    ),
    (
        "user_sent_to_user",
        "{{ Sats }} sat sent to {{ User }}{% if RawSats != Sats %} ({{ RawSats }}){% endif %}.",
    ),
    (
        "giveaway_msg",
        "{{ User }} is giving {{ Sats }} sat away!",
    ),
    ("giveaway_button", "Claim"),
    (
        "giveflip_msg",
        "{{ User }} is giving {{ Sats }} sat away to a lucky person out of {{ Participants }}!",
    ),
    ("giveflip_button", "Try to win!"),
    (
        "lottery_msg",
        "A lottery round is starting! Entry fee: {{ EntrySats }} sat. Total participants: {{ Participants }}. Prize: {{ Prize }} sat. Registered: {{ Registered }}",
    ),
    ("lottery_button", "Join lottery!"),
    (
        "coinflips_enabled_msg",
        "Coinflips are {% if Enabled %}enabled{% else %}disabled{% endif %} in this group.",
    ),
    (
        "fundraise_ad",
        "Fundraising {{ Fund }} sat for {{ ToUser }}: {{ Participants }} participants, {{ Sats }} sat each. Registered: {{ Registered }}",
    ),
    ("fundraise_button", "Contribute!"),
    (
        "hidden_with_id",
        "Message hidden with id <code>{{ HiddenId }}</code>. {% if Public %}It will be revealed publicly once paid{% if Crowdfund > 1 %} by {{ Crowdfund }} people{% endif %}.{% else %}It will be revealed privately to {% if Times > 0 %}the first {{ Times }} payers{% else %}anyone who pays{% endif %}.{% endif %} Price: {{ Satoshis }} sat.",
    ),
    ("hidden_share_button", "Share in another chat"),
    ("hidden_reveal_button", "Pay {{ Sats }} sat to reveal"),
    (
        "hidden_msg_not_found",
        "Hidden message not found.",
    ),
    (
        "hidden_no_content",
        "Nothing to hide: reply to a message or write <code>preview~content</code>.",
    ),
    (
        "lnurl_invalid",
        "Invalid lnurl: {{ Err }}",
    ),
    (
        "lnurl_fail",
        "Failed to fulfill lnurl request: {{ Err }}",
    ),
    (
        "lnurl_voucher",
        "<a href=\"lightning:{{ Lnurl }}\">{{ Lnurl }}</a>",
    ),
    (
        "invoice_created",
        "<code>{{ Invoice }}</code>",
    ),
    (
        "pay_missing_invoice",
        "No invoice found. Send <code>/pay &lt;invoice&gt;</code> or reply to a message containing one.",
    ),
    (
        "pay_confirm",
        "{% if Description %}<i>{{ Description }}</i>\n{% endif %}Pay {{ Sats }} sat?\n<b>Hash</b>: {{ Hash }}",
    ),
    ("pay_confirm_button", "Confirm"),
    ("cancel_button", "Cancel"),
    (
        "payment_sent",
        "Payment of {{ Sats }} sat sent.",
    ),
    (
        "payment_failed",
        "Payment failed: {{ Err }}",
    ),
    (
        "decoded_invoice",
        "<b>Amount</b>: {% if Sats %}{{ Sats }} sat{% else %}any{% endif %}\n<b>Description</b>: {{ Description }}\n<b>Payee</b>: {{ Payee }}\n<b>Hash</b>: {{ Hash }}",
    ),
    (
        "balance_msg",
        "<b>Balance</b>: {{ Sats }} sat\n<b>Total received</b>: {{ Received }} sat\n<b>Total sent</b>: {{ Sent }} sat\n<b>Total fees paid</b>: {{ Fees }} sat",
    ),
    (
        "transactions_list",
        "<b>Transactions</b>\n{% for tx in Transactions %}<code>{{ tx.sign }}{{ tx.sats }}</code> {% if tx.pending %}(pending) {% endif %}{{ tx.description }} /tx_{{ tx.hash }}\n{% else %}No transactions yet.{% endfor %}",
    ),
    (
        "transaction_detail",
        "<b>Hash</b>: {{ Hash }}\n<b>Amount</b>: {{ Sats }} sat\n<b>Description</b>: {{ Description }}{% if Pending %}\n<b>Status</b>: pending{% endif %}",
    ),
    (
        "transaction_not_found",
        "Couldn't find transaction {{ Hash }}.",
    ),
    (
        "group_not_renamable",
        "Renaming this group is not allowed.",
    ),
    (
        "rename_prompt",
        "Pay {{ Sats }} sat to rename this group to <i>{{ Name }}</i>?",
    ),
    ("rename_button", "Pay and rename"),
    (
        "free_join",
        "This group is now free to join.",
    ),
    (
        "ticket_msg",
        "New entrants will have to pay an invoice of {{ Sat }} sat (make sure you've set @{{ BotName }} as administrator for this to work).",
    ),
    (
        "renamable_msg",
        "Anyone can now rename this group for {{ Sat }} sat (make sure you've set @{{ BotName }} as administrator for this to work).",
    ),
    (
        "spammy_msg",
        "{% if Spammy %}This group is now spammy: notifications will be shown here.{% else %}Not spamming this group anymore.{% endif %}",
    ),
    (
        "language_msg",
        "Language set to <code>{{ Language }}</code>.",
    ),
    (
        "receive_help",
        "Generates a BOLT11 invoice with given satoshi value. Amounts will be added to your bot balance. If you don't provide the amount it will be an open-ended invoice that can be paid with any amount. <code>lnurl</code> redeems a withdraw voucher into your balance.",
    ),
    (
        "pay_help",
        "Decodes a BOLT11 invoice and asks if you want to pay it (unless /paynow). This is the same as just pasting or forwarding an invoice directly in the chat. <code>lnurl</code> generates a withdraw voucher a wallet can pull funds from; with an amount it pays without asking.",
    ),
    (
        "send_help",
        "Sends satoshis to other Telegram users. The receiver is notified on their chat with the bot. Reply to a message to send satoshis to its author; any extra text is attached as a note.",
    ),
    (
        "balance_help",
        "Shows your current balance in satoshis, plus the sum of everything you've received and sent within the bot and the total amount of fees paid.",
    ),
    (
        "giveaway_help",
        "Creates a button in a group chat. The first person to click the button gets the satoshis.",
    ),
    (
        "coinflip_help",
        "Starts a fair lottery with the given number of participants. Everybody pays the same amount as the entry fee. The winner gets it all.",
    ),
    (
        "giveflip_help",
        "Starts a giveaway, but instead of giving to the first person who clicks, the amount is raffled between the first x clickers.",
    ),
    (
        "fundraise_help",
        "Starts a crowdfunding event with a predefined number of participants and contribution amount. When everybody joined the total is sent to the receiver.",
    ),
    (
        "hide_help",
        "Hides a message so it can be unlocked later with a payment. Reply to a message or write <code>preview~content</code>. <code>--revealers</code> limits private reveals; <code>--crowdfund</code> requires that many payers and reveals publicly.",
    ),
    (
        "reveal_help",
        "Reveals a message that was previously hidden. The author of the hidden message is never disclosed.",
    ),
    (
        "toggle_help",
        "Toggles group settings: <code>ticket</code> charges new entrants, <code>renamable</code> lets anyone rename the group for a price, <code>spammy</code> shows notifications in the group, <code>coinflips</code> enables games, <code>language</code> changes the bot language.",
    ),
    (
        "help_help",
        "Shows full help or help about specific command.",
    ),
    (
        "lnurl_help",
        "Redeems an lnurl-withdraw voucher into your balance.",
    ),
];
